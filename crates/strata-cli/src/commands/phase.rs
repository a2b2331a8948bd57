// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compiler phase inspection commands: lex, parse, check.

use std::path::Path;

use colored::Colorize;
use strata_ast::token::Token;
use strata_compiler::{check, lex, parse, CompileError};
use strata_types::FnSig;

use crate::{output, read_source, report, CmdResult, Failed, Format};

/// Source text plus the display name errors are reported under.
struct Input {
    source: String,
    name: String,
}

impl Input {
    fn load(path: &Path, format: Format) -> Result<Self, Failed> {
        Ok(Self {
            source: read_source(path, format)?,
            name: path.display().to_string(),
        })
    }

    fn fail(&self, err: CompileError, format: Format) -> Failed {
        report(&err, &self.source, &self.name, format)
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            Err(Failed)
        }
    }
}

pub fn cmd_lex(path: &Path, format: Format) -> CmdResult {
    let input = Input::load(path, format)?;
    let tokens = lex(&input.source).map_err(|e| input.fail(e, format))?;

    match format {
        Format::Json => print_json(&tokens),
        Format::Human => {
            println!("{}\n", output::heading(&format!("Tokens ({})", tokens.len())));
            for tok in &tokens {
                println!("{}", token_line(tok));
            }
            println!("\n{}", output::banner_ok("Lex"));
            Ok(())
        }
    }
}

fn token_line(tok: &Token) -> String {
    format!("{:4}:{:<3} {:?}", tok.location.line, tok.location.column, tok.kind)
}

pub fn cmd_parse(path: &Path, format: Format) -> CmdResult {
    let input = Input::load(path, format)?;
    let stmts = lex(&input.source)
        .and_then(parse)
        .map_err(|e| input.fail(e, format))?;

    match format {
        Format::Json => print_json(&stmts),
        Format::Human => {
            println!("{}\n", output::heading(&format!("AST ({} statements)", stmts.len())));
            for stmt in &stmts {
                println!("{stmt:#?}");
            }
            println!("\n{}", output::banner_ok("Parse"));
            Ok(())
        }
    }
}

pub fn cmd_check(path: &Path, format: Format) -> CmdResult {
    let input = Input::load(path, format)?;
    let stmts = lex(&input.source)
        .and_then(parse)
        .map_err(|e| input.fail(e, format))?;
    let typed = check(&input.source, &stmts).map_err(|e| input.fail(e, format))?;

    let mut names: Vec<&String> = typed.functions.keys().collect();
    names.sort();
    match format {
        Format::Json => {
            let sigs: Vec<serde_json::Value> = names
                .iter()
                .map(|name| {
                    let sig = &typed.functions[*name];
                    serde_json::json!({
                        "name": name,
                        "params": sig.params.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        "returns": sig.ret.to_string(),
                    })
                })
                .collect();
            print_json(&serde_json::json!({ "success": true, "functions": sigs }))
        }
        Format::Human => {
            println!("{}\n", output::heading(&format!("Functions ({})", names.len())));
            for name in names {
                println!("  {}", signature(name, &typed.functions[name]));
            }
            println!("\n{}", output::banner_ok("Check"));
            Ok(())
        }
    }
}

fn signature(name: &str, sig: &FnSig) -> String {
    let params: Vec<String> = sig.params.iter().map(ToString::to_string).collect();
    format!("func {name}({}) => {}", params.join(", "), sig.ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_ast::ty::TypeDef;

    #[test]
    fn signatures_read_like_source() {
        let sig = FnSig {
            params: vec![TypeDef::INT, TypeDef::FLOAT],
            ret: TypeDef::BOOL,
        };
        assert_eq!(signature("cmp", &sig), "func cmp(int, float) => bool");
    }

    #[test]
    fn token_lines_are_positioned() {
        let tokens = lex("let x").unwrap();
        assert!(token_line(&tokens[1]).starts_with("   1:5  "));
    }
}
