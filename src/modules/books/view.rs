//! Server-rendered HTML for the shelf page.

use std::fmt::Write;

use super::models::Status;
use super::service::Snapshot;
use crate::utils::escape_html;

/// One-shot message shown above the shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Notice(String),
    Error(String),
}

impl Flash {
    /// Map a redirect's `notice` code to its message; unknown codes show nothing.
    pub fn from_notice(code: Option<&str>) -> Option<Self> {
        match code? {
            "saved" => Some(Flash::Notice("Saved!".to_string())),
            "updated" => Some(Flash::Notice("Updated!".to_string())),
            _ => None,
        }
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; display: flex; min-height: 100vh; }
aside { width: 18rem; padding: 1.5rem; background: #f4f4f6; }
main { flex: 1; padding: 1.5rem 2rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #ddd; padding: .4rem .6rem; text-align: left; }
label { display: block; margin-top: .6rem; }
input, select { width: 100%; padding: .3rem; }
.banner { padding: .8rem 1rem; border-radius: .4rem; margin: 1rem 0; }
.pick { background: #e3f6e8; }
.info { background: #e6f0fb; }
.notice { background: #e3f6e8; padding: .5rem 1rem; }
.error { background: #fbe4e4; padding: .5rem 1rem; }
.controls { display: flex; gap: 1rem; align-items: flex-end; }
"#;

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Book Club</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        STYLE, body
    )
}

/// The full page: add form, flash, banner, table and status control.
pub fn render_page(snapshot: &Snapshot, flash: Option<&Flash>) -> String {
    let mut body = String::new();

    body.push_str(&add_form());
    body.push_str("<main>\n<h1>📚 Book Club</h1>\n");

    match flash {
        Some(Flash::Notice(message)) => {
            let _ = writeln!(body, "<p class=\"notice\">{}</p>", escape_html(message));
        }
        Some(Flash::Error(message)) => {
            let _ = writeln!(body, "<p class=\"error\" role=\"alert\">{}</p>", escape_html(message));
        }
        None => {}
    }

    body.push_str(&banner(snapshot));
    body.push_str("<hr>\n<h2>The Shelf</h2>\n");
    body.push_str(&table(snapshot));
    body.push_str("<h2>Manage</h2>\n");
    body.push_str(&status_form(snapshot));
    body.push_str("</main>\n");

    document(&body)
}

/// Page shown when no store connection exists; it offers no forms.
pub fn render_halt(message: &str) -> String {
    document(&format!(
        "<main>\n<h1>📚 Book Club</h1>\n<p class=\"error\" role=\"alert\">Connection error: {}</p>\n</main>\n",
        escape_html(message)
    ))
}

fn banner(snapshot: &Snapshot) -> String {
    match snapshot.current_pick() {
        Some(pick) => format!(
            "<div class=\"banner pick\">🔥 <strong>Currently reading:</strong> {} ({})</div>\n",
            escape_html(&pick.title),
            escape_html(&pick.author)
        ),
        None => "<div class=\"banner info\">💡 No book of the month has been picked.</div>\n"
            .to_string(),
    }
}

fn table(snapshot: &Snapshot) -> String {
    let Some(first) = snapshot.rows.first() else {
        return "<p class=\"banner info\">The shelf is empty or the store could not be read.</p>\n"
            .to_string();
    };

    let mut html = String::from("<table>\n<thead><tr>");
    for column in first.columns() {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &snapshot.rows {
        html.push_str("<tr>");
        for column in first.columns() {
            let _ = write!(
                html,
                "<td>{}</td>",
                escape_html(row.get(column).unwrap_or_default())
            );
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn add_form() -> String {
    "<aside>\n<h2>Add a new book</h2>\n\
     <form method=\"post\" action=\"/books\">\n\
     <label>Title <input name=\"title\" autocomplete=\"off\"></label>\n\
     <label>Author <input name=\"author\" autocomplete=\"off\"></label>\n\
     <label>Owner <input name=\"owner\" autocomplete=\"off\"></label>\n\
     <p><button type=\"submit\">Save</button></p>\n\
     </form>\n</aside>\n"
        .to_string()
}

fn status_form(snapshot: &Snapshot) -> String {
    let titles = snapshot.titles();
    if titles.is_empty() {
        return "<p>No books to manage yet.</p>\n".to_string();
    }

    let mut html = String::from(
        "<form method=\"post\" action=\"/books/status\" class=\"controls\">\n\
         <label>Choose a book <select name=\"title\">",
    );
    for title in titles {
        let title = escape_html(title);
        let _ = write!(html, "<option value=\"{}\">{}</option>", title, title);
    }
    html.push_str("</select></label>\n<label>Status <select name=\"status\">");
    for status in Status::ALL {
        let _ = write!(
            html,
            "<option value=\"{}\">{}</option>",
            status.label(),
            status.label()
        );
    }
    html.push_str("</select></label>\n<button type=\"submit\">Update</button>\n</form>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookclub_sheets::Row;

    fn snapshot(lines: &[[&str; 4]]) -> Snapshot {
        let rows = lines
            .iter()
            .map(|line| {
                ["Title", "Author", "Owner", "Status"]
                    .into_iter()
                    .zip(line.iter().copied())
                    .collect::<Row>()
            })
            .collect();
        Snapshot::from_rows(rows)
    }

    #[test]
    fn banner_names_first_pick() {
        let html = render_page(
            &snapshot(&[
                ["Dune", "Herbert", "Alice", "Available"],
                ["Solaris", "Lem", "Bob", "Currently Reading"],
                ["Hyperion", "Simmons", "Bob", "Currently Reading"],
            ]),
            None,
        );
        assert!(html.contains("Currently reading:</strong> Solaris (Lem)"));
        assert!(!html.contains("Hyperion (Simmons)"));
    }

    #[test]
    fn banner_without_pick() {
        let html = render_page(&snapshot(&[["Dune", "Herbert", "Alice", "Lost"]]), None);
        assert!(html.contains("No book of the month"));
    }

    #[test]
    fn empty_shelf_has_message_and_no_status_form() {
        let html = render_page(&Snapshot::default(), None);
        assert!(html.contains("The shelf is empty"));
        assert!(!html.contains("action=\"/books/status\""));
        assert!(html.contains("action=\"/books\""));
    }

    #[test]
    fn table_escapes_cells() {
        let html = render_page(
            &snapshot(&[["<script>", "Herbert", "Alice", "Available"]]),
            None,
        );
        assert!(html.contains("<td>&lt;script&gt;</td>"));
        assert!(!html.contains("<td><script>"));
    }

    #[test]
    fn status_selector_lists_every_status() {
        let html = render_page(&snapshot(&[["Dune", "Herbert", "Alice", "Available"]]), None);
        for status in Status::ALL {
            assert!(html.contains(&format!("<option value=\"{}\">", status.label())));
        }
        assert!(html.contains("<option value=\"Dune\">Dune</option>"));
    }

    #[test]
    fn flash_messages() {
        assert_eq!(
            Flash::from_notice(Some("saved")),
            Some(Flash::Notice("Saved!".to_string()))
        );
        assert_eq!(Flash::from_notice(Some("<b>")), None);
        assert_eq!(Flash::from_notice(None), None);

        let html = render_page(
            &Snapshot::default(),
            Some(&Flash::Error("no book titled 'X'".to_string())),
        );
        assert!(html.contains("role=\"alert\">no book titled &#39;X&#39;</p>"));
    }

    #[test]
    fn halt_page_has_no_forms() {
        let html = render_halt("no credentials found");
        assert!(html.contains("Connection error: no credentials found"));
        assert!(!html.contains("<form"));
    }
}
