//! lopdf-based A4 typesetter.
//!
//! Content is laid out top to bottom in canonical section order using the
//! standard Helvetica faces (not embedded, WinAnsi encoded). When the cursor
//! reaches the bottom margin a new page is started.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use crate::models::resume::{
    Certification, Education, Experience, PersonalInfo, Project, ResumeContent, Skills,
};
use crate::models::section::Section;
use crate::render::metrics::Face;
use crate::render::{ensure_pdf, PdfRenderer, RenderError};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LEADING: f32 = 1.3;
const BULLET_INDENT: f32 = 12.0;
const COLUMN_GAP: f32 = 12.0;
const MAX_RIGHT_COLUMN: f32 = CONTENT_WIDTH / 2.0;

const NAME_SIZE: f32 = 18.0;
const CONTACT_SIZE: f32 = 9.0;
const HEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const DETAIL_SIZE: f32 = 9.0;

const ENTRY_GAP: f32 = 4.0;
const SECTION_GAP: f32 = 8.0;

/// Renders `ResumeContent` as a one-column A4 résumé.
#[derive(Debug, Default, Clone, Copy)]
pub struct Typesetter;

impl PdfRenderer for Typesetter {
    fn render(&self, content: &ResumeContent) -> Result<Vec<u8>, RenderError> {
        assemble(lay_out(content))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section layout
// ────────────────────────────────────────────────────────────────────────────

fn lay_out(content: &ResumeContent) -> Vec<Vec<Operation>> {
    let mut page = PageWriter::new();

    for section in Section::ALL {
        match section {
            Section::PersonalInfo => {
                if let Some(info) = &content.personal_info {
                    write_header(&mut page, info);
                }
            }
            Section::ProfessionalSummary => {
                if let Some(summary) = content.professional_summary.as_deref() {
                    if !summary.trim().is_empty() {
                        page.heading(section.title());
                        page.paragraph(Face::Regular, BODY_SIZE, summary);
                    }
                }
            }
            Section::Education => {
                if let Some(entries) = non_empty(&content.education) {
                    page.heading(section.title());
                    entries.iter().for_each(|e| write_education(&mut page, e));
                }
            }
            Section::Experience => {
                if let Some(entries) = non_empty(&content.experience) {
                    page.heading(section.title());
                    entries.iter().for_each(|e| write_experience(&mut page, e));
                }
            }
            Section::Projects => {
                if let Some(entries) = non_empty(&content.projects) {
                    page.heading(section.title());
                    entries.iter().for_each(|p| write_project(&mut page, p));
                }
            }
            Section::Skills => {
                if let Some(skills) = &content.skills {
                    write_skills(&mut page, skills);
                }
            }
            Section::Achievements => {
                if let Some(items) = non_empty(&content.achievements) {
                    page.heading(section.title());
                    items.iter().for_each(|item| page.bullet(item));
                }
            }
            Section::Certifications => {
                if let Some(entries) = non_empty(&content.certifications) {
                    page.heading(section.title());
                    entries.iter().for_each(|c| write_certification(&mut page, c));
                }
            }
        }
    }

    page.finish()
}

fn non_empty<T>(items: &Option<Vec<T>>) -> Option<&[T]> {
    items.as_deref().filter(|items| !items.is_empty())
}

fn write_header(page: &mut PageWriter, info: &PersonalInfo) {
    page.centered(Face::Bold, NAME_SIZE, &info.name);

    let optional = [&info.linkedin, &info.github, &info.website];
    let contact = [&info.email, &info.phone, &info.location]
        .into_iter()
        .map(String::as_str)
        .chain(optional.into_iter().filter_map(|v| v.as_deref()))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");
    page.centered(Face::Regular, CONTACT_SIZE, &contact);
    page.gap(ENTRY_GAP);
}

fn write_education(page: &mut PageWriter, edu: &Education) {
    page.row(&edu.degree, &edu.year);

    let mut details = vec![edu.institution.clone()];
    if let Some(gpa) = edu.gpa.as_deref().filter(|g| !g.trim().is_empty()) {
        details.push(format!("GPA: {gpa}"));
    }
    page.paragraph(Face::Regular, BODY_SIZE, &joined(&details));
    page.labeled("Relevant Courses", &edu.relevant_courses.join(", "), DETAIL_SIZE);
    page.gap(ENTRY_GAP);
}

fn write_experience(page: &mut PageWriter, exp: &Experience) {
    page.row(&exp.title, &exp.duration);
    page.paragraph(Face::Regular, BODY_SIZE, &exp.company);
    for line in exp.description.iter().chain(&exp.achievements) {
        page.bullet(line);
    }
    page.labeled("Technologies", &exp.technologies.join(", "), DETAIL_SIZE);
    page.gap(ENTRY_GAP);
}

fn write_project(page: &mut PageWriter, project: &Project) {
    page.row(&project.name, "");
    page.paragraph(Face::Regular, BODY_SIZE, &project.description);
    for line in &project.achievements {
        page.bullet(line);
    }
    page.labeled("Technologies", &project.technologies.join(", "), DETAIL_SIZE);

    let links: Vec<String> = [&project.url, &project.github]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    page.paragraph(Face::Regular, DETAIL_SIZE, &joined(&links));
    page.gap(ENTRY_GAP);
}

fn write_skills(page: &mut PageWriter, skills: &Skills) {
    let categories = skills.ordered_categories();
    if categories.is_empty() {
        return;
    }
    page.heading(Section::Skills.title());
    for (category, items) in categories {
        page.labeled(&title_case(category), &items.join(", "), BODY_SIZE);
    }
}

fn write_certification(page: &mut PageWriter, cert: &Certification) {
    page.row(&cert.name, &cert.date);

    let mut details = vec![cert.issuer.clone()];
    if let Some(expiry) = &cert.expiry_date {
        details.push(format!("Expires: {expiry}"));
    }
    if let Some(url) = &cert.url {
        details.push(url.clone());
    }
    page.paragraph(Face::Regular, DETAIL_SIZE, &joined(&details));
    page.gap(ENTRY_GAP);
}

fn joined(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn title_case(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page writer
// ────────────────────────────────────────────────────────────────────────────

/// Tracks the baseline cursor and collects drawing operations per page.
struct PageWriter {
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.finished.push(self.current);
        self.finished
    }

    /// Starts a new page unless `height` points still fit above the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let full = std::mem::take(&mut self.current);
            self.finished.push(full);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    /// Moves down one line of `size` and returns its baseline.
    fn next_line(&mut self, size: f32) -> f32 {
        let line_height = size * LEADING;
        self.reserve(line_height);
        let baseline = self.y - size;
        self.y -= line_height;
        baseline
    }

    fn draw(&mut self, face: Face, size: f32, x: f32, baseline: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(face.resource_name().as_bytes().to_vec()),
                    points(size),
                ],
            ),
            Operation::new("Td", vec![points(x), points(baseline)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn heading(&mut self, title: &str) {
        self.gap(SECTION_GAP);
        // keep a heading on the same page as at least two body lines
        self.reserve(HEADING_SIZE * LEADING + 2.0 * BODY_SIZE * LEADING);
        let baseline = self.next_line(HEADING_SIZE);
        self.draw(Face::Bold, HEADING_SIZE, MARGIN, baseline, &title.to_uppercase());

        let rule_y = baseline - 3.0;
        self.current.extend([
            Operation::new("w", vec![Object::Integer(1)]),
            Operation::new("m", vec![points(MARGIN), points(rule_y)]),
            Operation::new("l", vec![points(PAGE_WIDTH - MARGIN), points(rule_y)]),
            Operation::new("S", vec![]),
        ]);
        self.gap(ENTRY_GAP);
    }

    fn centered(&mut self, face: Face, size: f32, text: &str) {
        let text = clean_text(text);
        let metrics = face.metrics();
        for line in metrics.wrap(&text, size, CONTENT_WIDTH, CONTENT_WIDTH) {
            let baseline = self.next_line(size);
            let x = (PAGE_WIDTH - metrics.measure_str(&line, size)) / 2.0;
            self.draw(face, size, x, baseline, &line);
        }
    }

    fn paragraph(&mut self, face: Face, size: f32, text: &str) {
        let text = clean_text(text);
        for line in face.metrics().wrap(&text, size, CONTENT_WIDTH, CONTENT_WIDTH) {
            let baseline = self.next_line(size);
            self.draw(face, size, MARGIN, baseline, &line);
        }
    }

    fn bullet(&mut self, text: &str) {
        let text = clean_text(text);
        let width = CONTENT_WIDTH - BULLET_INDENT;
        let lines = Face::Regular.metrics().wrap(&text, BODY_SIZE, width, width);
        for (i, line) in lines.iter().enumerate() {
            let baseline = self.next_line(BODY_SIZE);
            if i == 0 {
                self.draw(Face::Regular, BODY_SIZE, MARGIN + 3.0, baseline, "•");
            }
            self.draw(Face::Regular, BODY_SIZE, MARGIN + BULLET_INDENT, baseline, line);
        }
    }

    /// Bold `left` text with `right` flush against the right margin on the first line.
    /// A `right` wider than `MAX_RIGHT_COLUMN` continues under the left text.
    fn row(&mut self, left: &str, right: &str) {
        let left = clean_text(left);
        let right = clean_text(right);
        let right_lines = Face::Regular
            .metrics()
            .wrap(&right, BODY_SIZE, MAX_RIGHT_COLUMN, CONTENT_WIDTH);
        let (right_first, right_rest) = match right_lines.split_first() {
            Some((first, rest)) => (first.as_str(), rest),
            None => ("", &[][..]),
        };
        let right_width = Face::Regular.metrics().measure_str(right_first, BODY_SIZE);
        let first_width = if right_first.is_empty() {
            CONTENT_WIDTH
        } else {
            CONTENT_WIDTH - right_width - COLUMN_GAP
        };

        let mut lines = Face::Bold
            .metrics()
            .wrap(&left, BODY_SIZE, first_width, CONTENT_WIDTH);
        if lines.is_empty() {
            if right_first.is_empty() {
                return;
            }
            lines.push(String::new());
        }

        for (i, line) in lines.iter().enumerate() {
            let baseline = self.next_line(BODY_SIZE);
            self.draw(Face::Bold, BODY_SIZE, MARGIN, baseline, line);
            if i == 0 {
                let x = PAGE_WIDTH - MARGIN - right_width;
                self.draw(Face::Regular, BODY_SIZE, x, baseline, right_first);
            }
        }
        for line in right_rest {
            let baseline = self.next_line(BODY_SIZE);
            self.draw(Face::Regular, BODY_SIZE, MARGIN, baseline, line);
        }
    }

    /// `Label: text`, label in bold, text wrapping back to the left margin.
    fn labeled(&mut self, label: &str, text: &str, size: f32) {
        let text = clean_text(text);
        if text.trim().is_empty() {
            return;
        }
        let label = format!("{}: ", clean_text(label));
        let label_width = Face::Bold.metrics().measure_str(&label, size);
        let lines = Face::Regular
            .metrics()
            .wrap(&text, size, CONTENT_WIDTH - label_width, CONTENT_WIDTH);

        for (i, line) in lines.iter().enumerate() {
            let baseline = self.next_line(size);
            if i == 0 {
                self.draw(Face::Bold, size, MARGIN, baseline, &label);
                self.draw(Face::Regular, size, MARGIN + label_width, baseline, line);
            } else {
                self.draw(Face::Regular, size, MARGIN, baseline, line);
            }
        }
    }
}

fn points(value: f32) -> Object {
    Object::Integer(value.round() as i64)
}

// ────────────────────────────────────────────────────────────────────────────
// Text encoding
// ────────────────────────────────────────────────────────────────────────────

/// Strips `**` emphasis markers, flattens whitespace and replaces characters
/// the WinAnsi encoding cannot show with `?`.
fn clean_text(text: &str) -> String {
    text.replace("**", "")
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                ' '
            } else if win_ansi_byte(c).is_some() {
                c
            } else {
                '?'
            }
        })
        .collect()
}

fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{a1}'..='\u{ff}' => Some(c as u32 as u8),
        '€' => Some(0x80),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '™' => Some(0x99),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document assembly
// ────────────────────────────────────────────────────────────────────────────

fn assemble(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in [Face::Regular, Face::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let stream = Content { operations }.encode().map_err(assembly_error)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, stream));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![points(0.0), points(0.0), points(PAGE_WIDTH), points(PAGE_HEIGHT)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(assembly_error)?;
    ensure_pdf(bytes)
}

fn assembly_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Assembly(e.to_string())
}
