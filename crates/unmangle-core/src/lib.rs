use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod resolver;
pub mod summary;
pub mod words;

pub use resolver::{ReplacementMemo, ReplacementTable, Resolver, BUILTIN_REPLACEMENTS};
pub use summary::render_summary;
pub use words::{Word, WordExtractor, BOUNDARY_CHARS, DEFAULT_PLACEHOLDER};

#[derive(thiserror::Error, Debug)]
pub enum UnmangleError {
    #[error("Target directory does not exist: {path:?}")]
    MissingTarget { path: PathBuf },
    #[error("Target must be a directory: {path:?}")]
    NotADirectory { path: PathBuf },
    #[error("Placeholder {placeholder:?} cannot be whitespace or a word boundary (. _ - ( ))")]
    InvalidPlaceholder { placeholder: char },
    #[error("Pattern error: {message}")]
    Pattern { message: String },
    #[error("Failed to rename {from:?} -> {to:?}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct RenameOptions {
    pub dry_run: bool,
}

#[derive(Debug, Default)]
pub struct UnmangleResult {
    pub entries_scanned: usize,
    pub paths_renamed: usize,
    pub memo: ReplacementMemo,
}

/// Walks `target` deepest-first and repairs every name containing the
/// resolver's placeholder. The target itself is never renamed.
pub fn process_directory<F>(
    target: &Path,
    mut resolver: Resolver,
    options: &RenameOptions,
    mut prompt: F,
) -> Result<UnmangleResult>
where
    F: FnMut(&str, &str) -> Result<String>,
{
    if !target.exists() {
        return Err(UnmangleError::MissingTarget { path: target.to_path_buf() }.into());
    }
    if !target.is_dir() {
        return Err(UnmangleError::NotADirectory { path: target.to_path_buf() }.into());
    }

    info!("Starting directory processing: {:?}", target);

    let mut result = UnmangleResult::default();
    process_directory_recursive(target, &mut resolver, options, &mut prompt, &mut result)?;
    result.memo = resolver.into_memo();

    info!(
        "Processing complete: {} entries scanned, {} paths renamed, {} replacements learned",
        result.entries_scanned,
        result.paths_renamed,
        result.memo.len()
    );

    Ok(result)
}

fn process_directory_recursive<F>(
    dir: &Path,
    resolver: &mut Resolver,
    options: &RenameOptions,
    prompt: &mut F,
    result: &mut UnmangleResult,
) -> Result<()>
where
    F: FnMut(&str, &str) -> Result<String>,
{
    debug!("Processing directory: {:?}", dir);

    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(UnmangleError::from)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(UnmangleError::from)?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in &entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(UnmangleError::from)?;
        if file_type.is_dir() {
            dirs.push((path, true));
        } else if file_type.is_symlink() && path.is_dir() {
            // Listed with the directories, never followed.
            dirs.push((path, false));
        } else {
            files.push(path);
        }
    }

    // Descend first so children are renamed under their parent's old name
    for (path, descend) in &dirs {
        if *descend {
            process_directory_recursive(path, resolver, options, prompt, result)?;
        }
    }

    for (path, _) in &dirs {
        rename_entry(path, resolver, options, prompt, result)?;
    }

    for path in &files {
        rename_entry(path, resolver, options, prompt, result)?;
    }

    Ok(())
}

/// Resolves one entry's basename and renames it when the name changes.
/// Returns the path the entry ends up at.
pub fn rename_entry<F>(
    path: &Path,
    resolver: &mut Resolver,
    options: &RenameOptions,
    prompt: &mut F,
    result: &mut UnmangleResult,
) -> Result<PathBuf>
where
    F: FnMut(&str, &str) -> Result<String>,
{
    result.entries_scanned += 1;

    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        debug!("Skipping path without a file name: {:?}", path);
        return Ok(path.to_path_buf());
    };
    let Some(old_name) = file_name.to_str() else {
        warn!("Skipping non UTF-8 name: {:?}", path);
        return Ok(path.to_path_buf());
    };

    let new_name = resolver.resolve(old_name, prompt)?;
    if new_name == old_name {
        return Ok(path.to_path_buf());
    }

    let new_path = parent.join(&new_name);
    if options.dry_run {
        info!("Would rename: {:?} -> {:?}", path, new_path);
    } else {
        fs::rename(path, &new_path).map_err(|source| UnmangleError::Rename {
            from: path.to_path_buf(),
            to: new_path.clone(),
            source,
        })?;
        info!("Renamed: {:?} -> {:?}", path, new_path);
    }
    result.paths_renamed += 1;

    Ok(new_path)
}
