//! CLI: load OpenAPI document(s) → (ir | mock | handlers)
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::doc::Document;
use crate::options::{Delay, MockOptions, PropertyOverride};
use crate::render::{self, OperationArtifact};
use crate::resolve::{Scope, synthesize};

// ------------------------------- Types ------------------------------------- //

/// generate deterministic mock data and MSW handlers from OpenAPI documents
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// resolve schemas and print the value-descriptor debug view
    Ir(IrOut),
    /// resolve schemas and print one mock expression per schema
    Mock(MockOut),
    /// emit a complete MSW handler module for every operation
    Handlers(HandlersOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more OpenAPI JSON documents. May be literal paths or quoted
    /// glob patterns; multiple documents merge into one component space.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON Pointer to select a subdocument first (e.g. /definitions/v1)
    #[arg(long)]
    json_pointer: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct GenerationSettings {
    /// force every property present, ignoring `required` sets
    #[arg(long, default_value_t = false)]
    required: bool,

    /// property override, `selector=expression` (repeatable)
    #[arg(long = "override")]
    overrides: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct IrOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    generation: GenerationSettings,

    /// only this component schema (default: all)
    #[arg(long)]
    schema: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct MockOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    generation: GenerationSettings,

    /// only this component schema (default: all)
    #[arg(long)]
    schema: Option<String>,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct HandlersOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    generation: GenerationSettings,

    /// handler delay in milliseconds (default 1000)
    #[arg(long)]
    delay: Option<u64>,

    /// route base URL (wildcard `*` if omitted)
    #[arg(long)]
    base_url: Option<String>,

    /// faker locale subpath for the generated import header
    #[arg(long)]
    locale: Option<String>,

    /// output .ts file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ---------------------------- Implementation ------------------------------- //

impl InputSettings {
    fn load(&self) -> anyhow::Result<Document> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;

        let mut merged = Document::default();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read {source_path_str}"))?;
            let mut value: serde_json::Value = serde_json::from_str(&source)
                .with_context(|| format!("failed to parse JSON in {source_path_str}"))?;

            if let Some(pointer) = self.json_pointer.as_deref() {
                value = value
                    .pointer(pointer)
                    .cloned()
                    .with_context(|| {
                        format!("JSON pointer {pointer} matched nothing in {source_path_str}")
                    })?;
            }

            let doc = Document::from_value(&value)
                .with_context(|| format!("failed to load {source_path_str}"))?;
            merged.schemas.extend(doc.schemas);
            merged.operations.extend(doc.operations);
        }
        Ok(merged)
    }
}

impl GenerationSettings {
    fn to_options(&self) -> anyhow::Result<MockOptions> {
        let mut opts = MockOptions { required: self.required, ..Default::default() };
        for raw in &self.overrides {
            opts.properties.push(PropertyOverride::parse(raw)?);
        }
        Ok(opts)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Ir(target) => {
                let doc = target.input_settings.load()?;
                let opts = target.generation.to_options()?;
                for (name, node) in selected_schemas(&doc, target.schema.as_deref())? {
                    let scope = Scope { doc: &doc, operation_id: name, tags: &[] };
                    let synthesis = synthesize(node, &opts, &scope)
                        .with_context(|| format!("failed to resolve schema {name}"))?;
                    println!("// {name}");
                    println!("{:#?}", synthesis.value);
                }
                Ok(())
            }
            Command::Mock(target) => {
                let doc = target.input_settings.load()?;
                let opts = target.generation.to_options()?;
                let mut out = String::new();
                for (name, node) in selected_schemas(&doc, target.schema.as_deref())? {
                    let scope = Scope { doc: &doc, operation_id: name, tags: &[] };
                    let synthesis = synthesize(node, &opts, &scope)
                        .with_context(|| format!("failed to resolve schema {name}"))?;
                    out.push_str(&format!(
                        "// {name}\n{}\n",
                        render::render_value(&synthesis.value)
                    ));
                }
                write_output(target.out.as_deref(), &out)
            }
            Command::Handlers(target) => {
                let doc = target.input_settings.load()?;
                let mut opts = target.generation.to_options()?;
                opts.delay = target.delay.map(Delay::Millis);
                opts.base_url = target.base_url.clone();
                opts.locale = target.locale.clone();

                // Operations are independent, each with its own fresh
                // resolution context. collect() keeps document order.
                let artifacts: Vec<OperationArtifact> = doc
                    .operations
                    .par_iter()
                    .map(|op| -> anyhow::Result<OperationArtifact> {
                        let synthesis = match &op.response {
                            Some(schema) => {
                                let scope = Scope {
                                    doc: &doc,
                                    operation_id: &op.id,
                                    tags: &op.tags,
                                };
                                Some(synthesize(schema, &opts, &scope).with_context(|| {
                                    format!("failed to resolve response of {}", op.id)
                                })?)
                            }
                            None => {
                                eprintln!(
                                    "{}",
                                    format!(
                                        "warning: {}: no JSON response schema, emitting empty handler",
                                        op.id
                                    )
                                    .yellow()
                                );
                                None
                            }
                        };
                        Ok(render::render_operation(op, synthesis.as_ref(), &opts))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;

                write_output(target.out.as_deref(), &render::render_module(&artifacts, &opts))
            }
        }
    }
}

// --------------------------- Internal helpers ------------------------------ //

fn selected_schemas<'a>(
    doc: &'a Document,
    only: Option<&str>,
) -> anyhow::Result<Vec<(&'a str, &'a crate::schema::SchemaNode)>> {
    match only {
        // Borrow the key back out of the map so the selection only holds
        // onto the document, not the caller's name.
        Some(name) => {
            let (key, node) = doc
                .schemas
                .get_key_value(name)
                .with_context(|| format!("no component schema named {name}"))?;
            Ok(vec![(key.as_str(), node)])
        }
        None => Ok(doc.schemas.iter().map(|(k, v)| (k.as_str(), v)).collect()),
    }
}

fn write_output(out: Option<&std::path::Path>, content: &str) -> anyhow::Result<()> {
    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(out, content)
            .with_context(|| format!("failed to write {}", out.display()))?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                let path = entry?;
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> Document {
        Document::from_value(&json!({
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                        "required": ["name"]
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn schema_selection_borrows_from_the_document_only() {
        let doc = sample_doc();
        // The selection must stay usable after the lookup name is gone.
        let picked = {
            let wanted = String::from("Pet");
            selected_schemas(&doc, Some(&wanted)).unwrap()
        };
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].0, "Pet");

        assert_eq!(selected_schemas(&doc, None).unwrap().len(), 1);
        assert!(selected_schemas(&doc, Some("Missing")).is_err());
    }

    #[test]
    fn override_flags_parse_into_options() {
        let settings = GenerationSettings {
            required: true,
            overrides: vec!["id=faker.number.int()".to_string()],
        };
        let opts = settings.to_options().unwrap();
        assert!(opts.required);
        assert_eq!(opts.properties.len(), 1);

        let bad = GenerationSettings {
            required: false,
            overrides: vec!["no-equals-here".to_string()],
        };
        assert!(bad.to_options().is_err());
    }
}
