mod backend;
mod frontend;
mod middleend;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use backend::arm32::generate_assembly;
use frontend::lexer::lexer::Lexer;
use frontend::parser::ast::CompileUnit;
use frontend::parser::parser::Parser;
use middleend::ir::emitter::emit_module;
use middleend::ir::lower::Lower;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    AstPretty,
    AstJson,
    Ir,
    Asm,
}

fn print_usage() {
    eprintln!(
        "Usage:
  minicc (--ast | --ast-json | --ir | --asm) [INPUT] [--out OUTPUT] [--show-ir]

Notes:
  - Exactly one output mode must be selected.
  - If INPUT is omitted, source is read from stdin.
  - If --out is omitted, the result is printed to stdout.
  - --show-ir prints each IR instruction as an assembly comment (only with --asm)."
    );
}

fn read_source(maybe_path: Option<&Path>) -> io::Result<String> {
    match maybe_path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), String> {
    if let Some(p) = path {
        fs::write(p, content).map_err(|e| format!("write {}: {e}", p.display()))
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}

fn parse_source(src: String) -> Result<CompileUnit, String> {
    let mut lexer = Lexer::new(src).map_err(|e| format!("lex error: {e}"))?;
    let tokens = lexer.tokenize().map_err(|e| format!("lex error: {e}"))?;
    let mut parser = Parser::new(tokens);
    parser.parse().map_err(|e| format!("parse error: {e}"))
}

fn run_compile(mode: Mode, src: String, out_path: Option<&Path>, show_ir: bool) -> i32 {
    let unit = match parse_source(src) {
        Ok(unit) => unit,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let rendered = match mode {
        Mode::AstPretty => format!("{:#?}", unit),
        Mode::AstJson => match serde_json::to_string_pretty(&unit) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("ast to json failed: {e}");
                return 1;
            }
        },
        Mode::Ir | Mode::Asm => {
            let module = match Lower::new(&unit).run() {
                Ok(module) => module,
                Err(e) => {
                    eprintln!("semantic error: {e}");
                    return 1;
                }
            };
            if mode == Mode::Ir {
                emit_module(&module)
            } else {
                let (text, errors) = generate_assembly(&module, show_ir);
                for error in &errors {
                    eprintln!("backend error: {error}");
                }
                if let Err(e) = write_output(out_path, &text) {
                    eprintln!("{e}");
                    return 1;
                }
                return if errors.is_empty() { 0 } else { 1 };
            }
        }
    };

    if let Err(e) = write_output(out_path, &rendered) {
        eprintln!("{e}");
        return 1;
    }
    0
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let Some(flag) = args.next() else {
        print_usage();
        return ExitCode::from(1);
    };

    let mode = match flag.as_str() {
        "--ast" => Mode::AstPretty,
        "--ast-json" => Mode::AstJson,
        "--ir" => Mode::Ir,
        "--asm" => Mode::Asm,
        other => {
            eprintln!("Unknown flag: {other}");
            print_usage();
            return ExitCode::from(1);
        }
    };

    let mut input_path: Option<PathBuf> = None;
    let mut out_path: Option<PathBuf> = None;
    let mut show_ir = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                let Some(p) = args.next() else {
                    eprintln!("--out requires a path");
                    return ExitCode::from(1);
                };
                out_path = Some(PathBuf::from(p));
            }
            "--show-ir" => {
                show_ir = true;
            }
            _ if arg.starts_with("--") => {
                eprintln!("Unknown option: {arg}");
                print_usage();
                return ExitCode::from(1);
            }
            _ => {
                if input_path.is_none() {
                    input_path = Some(PathBuf::from(arg));
                } else {
                    eprintln!("Too many positional arguments");
                    print_usage();
                    return ExitCode::from(1);
                }
            }
        }
    }

    if show_ir && mode != Mode::Asm {
        eprintln!("--show-ir is only meaningful with --asm");
        return ExitCode::from(1);
    }

    let src = match read_source(input_path.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            if let Some(p) = &input_path {
                eprintln!("failed to read {}: {e}", p.display());
            } else {
                eprintln!("failed to read input: {e}");
            }
            return ExitCode::from(1);
        }
    };

    let code = run_compile(mode, src, out_path.as_deref(), show_ir);
    ExitCode::from(code as u8)
}
