//! Rename template parser/renderer (§3, §9). A small literal-run + `{tag[:fmt]}`
//! token parser, deliberately not a general expression language.

use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
enum Token {
    Literal(String),
    Tag { name: String, format: Option<String> },
}

#[derive(Debug, Clone)]
pub struct RenameTemplate {
    tokens: Vec<Token>,
}

#[derive(Debug)]
pub struct RenderContext<'a> {
    pub capture_time: Option<NaiveDateTime>,
    pub exec_time: NaiveDateTime,
    pub seq: u32,
    pub orig_stem: &'a str,
    pub ext: &'a str,
}

impl RenameTemplate {
    pub fn parse(template: &str) -> Self {
        let mut tokens = Vec::new();
        let mut chars = template.chars().peekable();
        let mut literal = String::new();

        while let Some(c) = chars.next() {
            if c == '{' {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                let mut body = String::new();
                for c2 in chars.by_ref() {
                    if c2 == '}' {
                        break;
                    }
                    body.push(c2);
                }
                let (name, format) = match body.split_once(':') {
                    Some((n, f)) => (n.to_string(), Some(f.to_string())),
                    None => (body, None),
                };
                tokens.push(Token::Tag { name, format });
            } else {
                literal.push(c);
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        RenameTemplate { tokens }
    }

    /// Render the template. Returns `None` when the result would be empty or
    /// would contain characters forbidden in a filename.
    pub fn render(&self, ctx: &RenderContext) -> Option<String> {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Tag { name, format } => {
                    out.push_str(&render_tag(name, format.as_deref(), ctx)?);
                }
            }
        }
        if out.is_empty() || contains_forbidden_chars(&out) {
            return None;
        }
        Some(out)
    }
}

fn contains_forbidden_chars(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
}

fn render_tag(name: &str, format: Option<&str>, ctx: &RenderContext) -> Option<String> {
    match name {
        "orig" => Some(ctx.orig_stem.to_string()),
        "ext" => Some(ctx.ext.to_string()),
        "seq" => {
            let width: usize = format.and_then(|f| f.parse().ok()).unwrap_or(1);
            Some(format!("{:0width$}", ctx.seq, width = width))
        }
        "capture_date" | "capture_time" => {
            let dt = ctx.capture_time?;
            Some(apply_strftime_pattern(dt, format.unwrap_or("YYYY-MM-DD")))
        }
        "exec_date" | "exec_time" => {
            Some(apply_strftime_pattern(ctx.exec_time, format.unwrap_or("YYYY-MM-DD")))
        }
        "year" => Some(apply_strftime_pattern(resolved_time(ctx)?, "YYYY")),
        "month" => Some(apply_strftime_pattern(resolved_time(ctx)?, "MM")),
        "day" => Some(apply_strftime_pattern(resolved_time(ctx)?, "DD")),
        "hour" => Some(apply_strftime_pattern(resolved_time(ctx)?, "hh")),
        "minute" => Some(apply_strftime_pattern(resolved_time(ctx)?, "mm")),
        "second" => Some(apply_strftime_pattern(resolved_time(ctx)?, "ss")),
        _ => Some(String::new()),
    }
}

fn resolved_time(ctx: &RenderContext) -> Option<NaiveDateTime> {
    Some(ctx.capture_time.unwrap_or(ctx.exec_time))
}

/// Translate the restricted Y/M/D/h/m/s format-letter vocabulary into a
/// concrete string; unrecognized letters pass through verbatim.
fn apply_strftime_pattern(dt: NaiveDateTime, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let run_len = chars[i..].iter().take_while(|&&ch| ch == c).count();
        match c {
            'Y' => out.push_str(&format!("{:0width$}", dt.format("%Y").to_string().parse::<i32>().unwrap_or(0), width = run_len.max(4))),
            'M' => out.push_str(&format!("{:0width$}", dt.format("%m").to_string().parse::<u32>().unwrap_or(0), width = run_len.max(2))),
            'D' => out.push_str(&format!("{:0width$}", dt.format("%d").to_string().parse::<u32>().unwrap_or(0), width = run_len.max(2))),
            'h' | 'H' => out.push_str(&format!("{:0width$}", dt.format("%H").to_string().parse::<u32>().unwrap_or(0), width = run_len.max(2))),
            'm' => out.push_str(&format!("{:0width$}", dt.format("%M").to_string().parse::<u32>().unwrap_or(0), width = run_len.max(2))),
            's' => out.push_str(&format!("{:0width$}", dt.format("%S").to_string().parse::<u32>().unwrap_or(0), width = run_len.max(2))),
            other => {
                out.extend(std::iter::repeat(other).take(run_len));
            }
        }
        i += run_len;
    }
    out
}
