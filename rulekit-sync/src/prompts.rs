//! Prompt sources and their three rendered variants.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rulekit_core::config::{PROMPTS_DIR, PROMPT_SOURCE_EXT};
use rulekit_core::fs::list_files;
use rulekit_core::{frontmatter, Document, StackName};
use rulekit_renderer::PromptFormat;

use crate::error::{io_err, SyncError};
use crate::writer::PlannedFile;

/// One canonical prompt, identified by stack and logical name.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSource {
    pub stack: StackName,
    pub name: String,
    pub path: PathBuf,
    pub document: Document,
}

/// `<source>/prompts/<stack>`
pub fn stack_prompts_dir(source: &Path, stack: &StackName) -> PathBuf {
    source.join(PROMPTS_DIR).join(stack.as_str())
}

/// Logical name of a prompt source file: its name without the `.md` extension.
pub fn logical_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(PROMPT_SOURCE_EXT)?;
    (!name.is_empty()).then(|| name.to_owned())
}

fn read_stack_prompts(source: &Path, stack: &StackName) -> Result<Vec<PromptSource>, SyncError> {
    let mut out = Vec::new();
    for path in list_files(&stack_prompts_dir(source, stack))? {
        let Some(name) = logical_name(&path) else {
            continue;
        };
        let raw = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let document = frontmatter::parse(&raw)?;
        out.push(PromptSource {
            stack: stack.clone(),
            name,
            path,
            document,
        });
    }
    Ok(out)
}

/// Prompt sources for `stack`: the common ones, then the stack's own.
///
/// A stack prompt with the same logical name as a common one replaces it.
pub fn discover_prompts(source: &Path, stack: &StackName) -> Result<Vec<PromptSource>, SyncError> {
    let mut by_name: BTreeMap<String, PromptSource> = BTreeMap::new();
    for prompt in read_stack_prompts(source, &StackName::common())? {
        by_name.insert(prompt.name.clone(), prompt);
    }
    if !stack.is_common() {
        for prompt in read_stack_prompts(source, stack)? {
            if by_name.contains_key(&prompt.name) {
                tracing::info!(
                    "prompt `{}` from stack `{}` overrides the common prompt",
                    prompt.name,
                    stack
                );
            }
            by_name.insert(prompt.name.clone(), prompt);
        }
    }
    Ok(by_name.into_values().collect())
}

/// Plan every prompt variant: three files per prompt source.
pub fn plan_prompts(
    source: &Path,
    target: &Path,
    stack: &StackName,
) -> Result<Vec<PlannedFile>, SyncError> {
    let mut planned = Vec::new();
    for prompt in discover_prompts(source, stack)? {
        for format in PromptFormat::all() {
            let text = format.render(&prompt.document, &prompt.name)?;
            planned.push(PlannedFile::text(
                format.output_path(target, &prompt.name),
                &text,
            ));
        }
    }
    Ok(planned)
}
