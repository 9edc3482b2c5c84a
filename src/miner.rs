use std::io::BufRead;

use thiserror::Error;

use crate::progress::{NullProgress, Progress};
use crate::refine;
use crate::syntax;
use crate::token::TokenSource;
use crate::tree::PatternTree;

/// Longest line we keep; excess within a line is dropped outright, never
/// carried into the next record.
pub const MAX_LINE_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}

/// One mining run: owns the pattern tree and the progress sink, so multiple
/// independent runs can coexist.
pub struct StructureMiner {
    tree: PatternTree,
    progress: Box<dyn Progress>,
}

impl StructureMiner {
    pub fn new() -> Self {
        Self::with_progress(Box::new(NullProgress))
    }

    pub fn with_progress(progress: Box<dyn Progress>) -> Self {
        StructureMiner {
            tree: PatternTree::new(),
            progress,
        }
    }

    /// Tokenize one raw line and insert its token sequence into the tree,
    /// keeping one token of lookahead for the insertion heuristic.
    pub fn ingest_line(&mut self, raw: &str) {
        self.progress.tick("reading");
        let line = clip_line(raw);
        let preprocessed = syntax::preprocess_line(line);
        let mut words = TokenSource::new(&preprocessed);
        let mut next = words.next_token();
        let mut level = self.tree.root();
        loop {
            let Some(current) = next else {
                self.tree.note_terminal(level);
                break;
            };
            next = words.next_token();
            level = self
                .tree
                .insert(level, current, next.as_ref().map(|t| t.text.as_str()));
        }
    }

    /// Ingest every non-empty line of a reader. Returns the number of lines
    /// added to the tree.
    pub fn ingest_reader<R: BufRead>(&mut self, reader: R) -> Result<usize, MinerError> {
        let mut added = 0;
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            self.ingest_line(&line);
            added += 1;
        }
        Ok(added)
    }

    /// Run the chain-collapse and prefix/suffix-factoring sweep.
    pub fn refine(&mut self) {
        refine::refine(&mut self.tree, self.progress.as_mut());
        self.progress.finish();
    }

    pub fn tree(&self) -> &PatternTree {
        &self.tree
    }
}

impl Default for StructureMiner {
    fn default() -> Self {
        Self::new()
    }
}

fn clip_line(line: &str) -> &str {
    if line.len() <= MAX_LINE_BYTES {
        return line;
    }
    let mut end = MAX_LINE_BYTES;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
