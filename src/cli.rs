//! Minimal CLI: denormalize documents against a schema, or report their runtime types.
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, Args};
use serde_json::json;

use crate::context::Context;
use crate::denormalize::Denormalizer;
use crate::error::DenormalizeError;
use crate::shape::Schema;
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// denormalize loosely-typed JSON into declared classes, reporting the runtime type of anything rejected
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// denormalize each document into a class; one JSON line per document
    Denormalize(DenormalizeOut),
    /// print the runtime type of each document and of its top-level entries
    TypeOf(TypeOfOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct DenormalizeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// schema document: {"classes": {"Name": {"field": "type"}}}
    #[arg(long)]
    schema: PathBuf,

    /// target class
    #[arg(long)]
    class: String,

    /// parse int/string input for bool fields with the permissive boolean filter
    #[arg(long, default_value_t = false)]
    filter_bool: bool,

    /// report every rejected field instead of stopping at the first
    #[arg(long, default_value_t = false)]
    collect_errors: bool,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct TypeOfOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_process(&self, mut apply: impl FnMut(serde_json::Value)) -> Result<()> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|e| anyhow::anyhow!("failed to resolve input file paths: {e}"))?;
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source_path_str})"))?;

            let documents = if self.ndjson {
                source
                    .lines()
                    .enumerate()
                    .filter(|(_, line)| !line.trim().is_empty())
                    .map(|(i, line)| {
                        serde_json::from_str::<serde_json::Value>(line)
                            .with_context(|| format!("failed to parse NDJSON line {} ({source_path_str})", i + 1))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                let json_value = serde_json::from_str::<serde_json::Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                vec![json_value]
            };

            for json_value in documents {
                let json_value = match self.json_pointer.as_deref() {
                    None => json_value,
                    Some(ptr) => match json_value.pointer(ptr) {
                        Some(node) => node.clone(),
                        None => {
                            tracing::warn!(pointer = ptr, file = %source_path_str, "json pointer matched nothing; skipping");
                            continue;
                        }
                    },
                };
                match self.jq_expr.as_ref() {
                    None => apply(json_value),
                    Some(jq_expr) => {
                        let result = crate::jq_exec::run_jaq(jq_expr, &json_value)
                            .with_context(|| format!("failed to apply jq expression to source file ({source_path_str})"))?;
                        for json_value in result {
                            apply(json_value)
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Returns `false` when any document failed to denormalize.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Denormalize(target) => {
                let schema = Schema::from_path(&target.schema)?;
                let context = Context::default()
                    .filter_bool(target.filter_bool)
                    .collect_errors(target.collect_errors);
                let denormalizer = Denormalizer::new(&schema).with_context(context);

                let mut lines = Vec::new();
                let mut all_ok = true;
                let mut fatal = None;
                target.input_settings.load_process(|doc| {
                    if fatal.is_some() {
                        return;
                    }
                    let raw = Value::from(doc);
                    match denormalizer.denormalize(&raw, &target.class) {
                        Ok(record) => lines.push(json!({ "ok": record })),
                        Err(e @ (DenormalizeError::NotNormalizable(_) | DenormalizeError::Partial(_))) => {
                            all_ok = false;
                            lines.push(json!({
                                "error": { "message": e.to_string(), "failures": e.failures() }
                            }));
                        }
                        Err(e) => fatal = Some(e),
                    }
                })?;
                if let Some(e) = fatal {
                    return Err(e.into());
                }
                write_lines(target.out.as_ref(), &lines)?;
                Ok(all_ok)
            }
            Command::TypeOf(target) => {
                let mut lines = Vec::new();
                target.input_settings.load_process(|doc| {
                    let raw = Value::from(doc);
                    let entries: serde_json::Map<String, serde_json::Value> = raw
                        .as_map()
                        .map(|m| m.iter().map(|(k, v)| (k.clone(), json!(v.debug_type()))).collect())
                        .unwrap_or_default();
                    lines.push(json!({ "type": raw.debug_type(), "entries": entries }));
                })?;
                write_lines(target.out.as_ref(), &lines)?;
                Ok(true)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_lines(out: Option<&PathBuf>, lines: &[serde_json::Value]) -> Result<()> {
    let mut src = String::new();
    for line in lines {
        src.push_str(&serde_json::to_string(line)?);
        src.push('\n');
    }
    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(out, &src).with_context(|| format!("failed to write {}", out.display()))?;
    } else {
        print!("{src}");
    }
    Ok(())
}

/// Expand literal paths and glob patterns, in argument order. A glob that
/// matches nothing is an error.
pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                // explicit glob that matched nothing is an error, not an empty run
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
