//! Server-rendered HTML pages.
//!
//! Every piece of user-supplied text passes through [`escape_html`] before it
//! lands in markup.

use std::fmt::Write;

use axum::http::StatusCode;
use models::student::StudentRecord;

/// One-shot notices shown on the index page after a redirect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Notices {
    pub added: bool,
    pub deleted: bool,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn student_rows(students: &[StudentRecord]) -> String {
    if students.is_empty() {
        return "<p class=\"empty\">No students registered yet.</p>".to_string();
    }
    let mut rows = String::from(
        "<table class=\"students\">\n<tr><th>ID</th><th>Name</th><th>CGPA</th><th>Career Interest</th><th>Photo</th></tr>\n",
    );
    for s in students {
        let _ = writeln!(
            rows,
            "<tr><td>{id}</td><td>{name}</td><td>{gpa:.2}</td><td>{interest}</td>\
             <td><img src=\"/{photo}\" alt=\"{name}\" width=\"64\"></td></tr>",
            id = s.id,
            name = escape_html(&s.name),
            gpa = s.gpa,
            interest = escape_html(&s.career_interest),
            photo = escape_html(&s.photo_path),
        );
    }
    rows.push_str("</table>");
    rows
}

const FORMS: &str = r#"<section>
<h2>Add student</h2>
<form action="/add" method="post" enctype="multipart/form-data">
<label>Name <input type="text" name="name" required></label>
<label>CGPA <input type="number" name="cgpa" step="0.01" min="2.00" max="4.00" required></label>
<label>Career interest <input type="text" name="career_interest"></label>
<label>Photo <input type="file" name="image" accept="image/*" required></label>
<button type="submit">Add</button>
</form>
</section>
<section>
<h2>Find student</h2>
<form action="/display" method="post">
<label>ID <input type="number" name="display_id" min="1" required></label>
<button type="submit">Display</button>
</form>
</section>
<section>
<h2>Remove student</h2>
<form action="/delete" method="post">
<label>ID <input type="number" name="delete_id" min="1" required></label>
<button type="submit">Delete</button>
</form>
</section>"#;

pub fn index_page(students: &[StudentRecord], notices: Notices) -> String {
    let mut body = String::from("<h1>Student Registry</h1>\n");
    if notices.added {
        body.push_str("<p class=\"notice\">Student added successfully.</p>\n");
    }
    if notices.deleted {
        body.push_str("<p class=\"notice\">Student deleted successfully.</p>\n");
    }
    body.push_str(FORMS);
    body.push_str("\n<section>\n<h2>Students</h2>\n");
    body.push_str(&student_rows(students));
    body.push_str("\n<p><a href=\"/all_students\">View all students</a></p>\n</section>");
    layout("Student Registry", &body)
}

pub fn all_students_page(students: &[StudentRecord]) -> String {
    let body = format!(
        "<h1>All Students</h1>\n{}\n<p><a href=\"/\">Back</a></p>",
        student_rows(students)
    );
    layout("All Students", &body)
}

pub fn student_details_page(s: &StudentRecord) -> String {
    let body = format!(
        "<h1>{name}</h1>\n<dl>\n<dt>ID</dt><dd>{id}</dd>\n<dt>CGPA</dt><dd>{gpa:.2}</dd>\n\
         <dt>Career Interest</dt><dd>{interest}</dd>\n</dl>\n\
         <img src=\"/{photo}\" alt=\"{name}\" width=\"200\">\n<p><a href=\"/\">Back</a></p>",
        name = escape_html(&s.name),
        id = s.id,
        gpa = s.gpa,
        interest = escape_html(&s.career_interest),
        photo = escape_html(&s.photo_path),
    );
    layout(&format!("Student {}", s.id), &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{code}</h1>\n<p class=\"error\">{message}</p>\n<p><a href=\"/\">Back</a></p>",
        code = status.as_u16(),
        message = escape_html(message),
    );
    layout("Error", &body)
}
