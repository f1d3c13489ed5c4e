//! A converter for [Fountain](https://fountain.io) screenplays. Produces the
//! script fragment only: one HTML block per screenplay element, separated by
//! newlines, with no title page or document boilerplate.
//!
//! Element markup:
//!
//! | element        | HTML                                             |
//! |----------------|--------------------------------------------------|
//! | scene heading  | `<h3>INT. HOUSE - DAY</h3>`                      |
//! | transition     | `<h2>CUT TO:</h2>`                               |
//! | dialogue       | `<div class="dialogue"><h4>BOB</h4><p>..</p></div>` |
//! | parenthetical  | `<p class="parenthetical">(beat)</p>`            |
//! | centered       | `<p class="centered">THE END</p>`                |
//! | page break     | `<hr />`                                         |
//! | action         | `<p>..</p>`                                      |
//!
//! Sections (`#`), synopses (`=`), notes (`[[..]]`), and boneyard
//! (`/* .. */`) are dropped.

use crate::markdown::{Converter, Error, Result};
use pulldown_cmark::escape::escape_html;

/// Title page keys. A leading block whose first line starts with one of
/// these followed by `:` is the title page and isn't part of the script.
const TITLE_PAGE_KEYS: &[&str] = &[
    "title",
    "credit",
    "author",
    "authors",
    "source",
    "notes",
    "draft date",
    "date",
    "contact",
    "copyright",
];

const SCENE_PREFIXES: &[&str] = &[
    "INT./EXT.",
    "INT./EXT ",
    "INT/EXT.",
    "INT/EXT ",
    "I/E.",
    "I/E ",
    "INT.",
    "INT ",
    "EXT.",
    "EXT ",
    "EST.",
    "EST ",
];

/// The Fountain screenplay converter.
pub struct Fountain;

impl Converter for Fountain {
    fn convert(&self, body: &str) -> Result<String> {
        let cleaned = remove_between(&remove_between(body, "/*", "*/"), "[[", "]]");
        if cleaned.trim().is_empty() {
            return Err(Error::EmptyScript);
        }

        let mut out: Vec<String> = Vec::new();
        for (i, block) in blocks(&cleaned).into_iter().enumerate() {
            if i == 0 && is_title_page(block[0]) {
                continue;
            }
            render_block(&block, &mut out);
        }

        if out.is_empty() {
            return Err(Error::EmptyScript);
        }
        Ok(out.join("\n"))
    }

    fn strips_newlines(&self) -> bool {
        false
    }
}

/// Splits the script into runs of non-blank lines.
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn render_block(block: &[&str], out: &mut Vec<String>) {
    let first = block[0];

    if block.len() > 1 && is_character(first) {
        out.push(dialogue(block));
        return;
    }

    if block.len() == 1 {
        if let Some(html) = single_line(first) {
            out.push(html);
        }
        return;
    }

    // a heading without the customary blank line after it
    let rest = match scene_heading(first) {
        Some(heading) => {
            out.push(format!("<h3>{}</h3>", inline(&heading)));
            &block[1..]
        }
        None => block,
    };
    out.push(action(rest));
}

/// Classifies a block made of a single line. Returns `None` for elements that
/// aren't rendered.
fn single_line(line: &str) -> Option<String> {
    if line.starts_with('!') {
        return Some(action(&[line]));
    }
    if line.starts_with('#') || (line.starts_with('=') && !is_page_break(line)) {
        return None;
    }
    if is_page_break(line) {
        return Some("<hr />".to_owned());
    }
    if line.starts_with('>') && line.ends_with('<') && line.len() > 1 {
        let inner = line[1..line.len() - 1].trim();
        return Some(format!("<p class=\"centered\">{}</p>", inline(inner)));
    }
    if let Some(heading) = scene_heading(line) {
        return Some(format!("<h3>{}</h3>", inline(&heading)));
    }
    if let Some(transition) = transition(line) {
        return Some(format!("<h2>{}</h2>", inline(transition)));
    }
    Some(action(&[line]))
}

fn is_page_break(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '=')
}

fn is_title_page(line: &str) -> bool {
    match line.find(':') {
        Some(i) => TITLE_PAGE_KEYS.contains(&line[..i].trim().to_lowercase().as_str()),
        None => false,
    }
}

/// Returns the heading text (scene number removed) if `line` is a scene
/// heading. A leading `.` forces a heading.
fn scene_heading(line: &str) -> Option<String> {
    let text = if line.starts_with('.') && !line.starts_with("..") && line.len() > 1 {
        &line[1..]
    } else {
        let upper = line.to_uppercase();
        if !SCENE_PREFIXES.iter().any(|p| upper.starts_with(p)) {
            return None;
        }
        line
    };

    let mut text = text.trim();
    if let Some(numbered) = text.strip_suffix('#') {
        if let Some(i) = numbered.rfind('#') {
            text = numbered[..i].trim_end();
        }
    }
    Some(text.to_owned())
}

/// Returns the transition text if `line` is a transition: an uppercase line
/// ending in `TO:`, or any line forced with a leading `>`.
fn transition(line: &str) -> Option<&str> {
    if line.starts_with('>') && !line.ends_with('<') {
        return Some(line[1..].trim());
    }
    if line.ends_with("TO:") && is_uppercase(line) {
        return Some(line);
    }
    None
}

/// A character cue is an uppercase line (extensions like `(V.O.)` allowed),
/// or any line forced with a leading `@`. A leading `!` forces action.
fn is_character(line: &str) -> bool {
    if line.starts_with('!') {
        return false;
    }
    if line.starts_with('@') {
        return line.len() > 1;
    }
    if scene_heading(line).is_some() || transition(line).is_some() {
        return false;
    }
    let name = match line.find('(') {
        Some(i) => &line[..i],
        None => line,
    };
    let name = name.trim_end_matches('^').trim();
    !name.is_empty() && is_uppercase(name)
}

fn is_uppercase(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

fn dialogue(block: &[&str]) -> String {
    let name = block[0].trim_start_matches('@').trim_end_matches('^').trim();
    let mut html = format!("<div class=\"dialogue\"><h4>{}</h4>", inline(name));

    let mut speech: Vec<&str> = Vec::new();
    for line in &block[1..] {
        if line.starts_with('(') && line.ends_with(')') {
            flush_speech(&mut speech, &mut html);
            html.push_str(&format!("<p class=\"parenthetical\">{}</p>", inline(line)));
        } else {
            speech.push(*line);
        }
    }
    flush_speech(&mut speech, &mut html);

    html.push_str("</div>");
    html
}

fn flush_speech(speech: &mut Vec<&str>, html: &mut String) {
    if !speech.is_empty() {
        let lines: Vec<String> = speech.iter().map(|l| inline(l)).collect();
        html.push_str(&format!("<p>{}</p>", lines.join("<br />")));
        speech.clear();
    }
}

fn action(lines: &[&str]) -> String {
    let lines: Vec<String> = lines
        .iter()
        .map(|l| inline(l.strip_prefix('!').unwrap_or(*l)))
        .collect();
    format!("<p>{}</p>", lines.join("<br />"))
}

/// Escapes `text` and applies Fountain emphasis: `***bold italic***`,
/// `**bold**`, `*italic*`, and `_underline_`.
fn inline(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let _ = escape_html(&mut escaped, text);
    let emphasized = wrap_pairs(
        &escaped,
        "***",
        "<strong><em>",
        "</em></strong>",
    );
    let emphasized = wrap_pairs(&emphasized, "**", "<strong>", "</strong>");
    let emphasized = wrap_pairs(&emphasized, "*", "<em>", "</em>");
    wrap_pairs(&emphasized, "_", "<u>", "</u>")
}

/// Replaces each pair of `marker`s with `open` and `close`. An unpaired
/// trailing marker is left as-is.
fn wrap_pairs(text: &str, marker: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(marker) {
        let after = &rest[start + marker.len()..];
        match after.find(marker) {
            Some(end) if end > 0 => {
                out.push_str(&rest[..start]);
                out.push_str(open);
                out.push_str(&after[..end]);
                out.push_str(close);
                rest = &after[end + marker.len()..];
            }
            _ => break,
        }
    }
    out.push_str(rest);
    out
}

/// Removes every span from `open` to the next `close`, inclusive. An
/// unterminated span runs to the end of the text.
fn remove_between(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        match rest[start + open.len()..].find(close) {
            Some(end) => rest = &rest[start + open.len() + end + close.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
