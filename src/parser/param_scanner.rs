use indexmap::IndexMap;

use crate::{
    database::SqlType,
    parser::{
        analyzer::ParamAnalysis,
        ast::{NameParser, Param, ParamParser, StringParser},
        QueryParser, WordComparer,
    },
};

/// Token-level placeholder scan that needs no grammar: strings, quoted
/// identifiers and comments are skipped, every `$n` outside them is reported.
pub struct ParamScanner;

impl ParamScanner {
    pub fn params(sql: &str) -> Vec<Param> {
        let mut parser = QueryParser::new(sql);
        let mut params = vec![];

        loop {
            parser.next_non_whitespace();
            if parser.eof() {
                break;
            }

            if ParamParser::is_param(&parser) {
                match ParamParser::parse(&mut parser) {
                    Ok(param) => params.push(param),
                    Err(_) => Self::skip_word(&mut parser),
                }
                continue;
            }

            if StringParser::is_string(&parser) {
                if StringParser::parse(&mut parser).is_err() {
                    break;
                }
                continue;
            }

            if parser.current() == '"' {
                if NameParser::parse(&mut parser).is_err() {
                    break;
                }
                continue;
            }

            if WordComparer::is_ident_start(parser.current()) {
                Self::skip_word(&mut parser);
                continue;
            }

            parser.next();
        }

        params
    }

    /// Distinct ordinals in ascending order.
    pub fn ordinals(sql: &str) -> Vec<usize> {
        let mut ordinals: Vec<usize> = Self::params(sql).iter().map(|param| param.ordinal).collect();
        ordinals.sort_unstable();
        ordinals.dedup();
        ordinals
    }

    /// Replaces each `$n` that has a value with a literal rendered for the
    /// ordinal's inferred type. Ordinals without a value stay as they are.
    pub fn substitute(sql: &str, values: &IndexMap<usize, String>, analysis: &ParamAnalysis) -> String {
        let text: Vec<char> = sql.chars().collect();
        let mut output = String::with_capacity(sql.len());
        let mut position = 0;

        for param in Self::params(sql) {
            let Some(value) = values.get(&param.ordinal) else {
                continue;
            };
            let ty = analysis
                .binding(param.ordinal)
                .map(|binding| binding.inferred_type.clone())
                .unwrap_or(SqlType::Text);

            output.extend(&text[position..param.offset]);
            output.push_str(&Self::render_literal(value, &ty));
            position = param.offset + param.length;
        }

        output.extend(&text[position.min(text.len())..]);
        output
    }

    pub fn render_literal(value: &str, ty: &SqlType) -> String {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return "NULL".to_string();
        }

        if ty.is_numeric() && trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
            return trimmed.to_string();
        }

        if ty.is_boolean() {
            match trimmed.to_lowercase().as_str() {
                "true" | "t" | "yes" | "on" | "1" => return "true".to_string(),
                "false" | "f" | "no" | "off" | "0" => return "false".to_string(),
                _ => {}
            }
        }

        let quoted = format!("'{}'", value.replace('\'', "''"));
        if ty.is_textual() {
            return quoted;
        }
        format!("{}::{}", quoted, ty)
    }

    pub fn explain(sql: &str) -> String {
        let statement = sql.trim().trim_end_matches(';').trim_end();
        format!("EXPLAIN (ANALYZE, BUFFERS, WAL, VERBOSE, SETTINGS, FORMAT JSON) {}", statement)
    }

    fn skip_word(parser: &mut QueryParser) {
        parser.next();
        while WordComparer::is_ident_char(parser.current()) {
            parser.next();
        }
    }
}
