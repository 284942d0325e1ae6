//! Name-to-example conversion for next-character prediction.
//!
//! Every name is framed by boundary symbols and walked with a fixed-width sliding
//! window: the window starts as all-boundary, each real character becomes a target,
//! and a final example targets the boundary code itself so the model learns where
//! names end.
//!
//! Shapes: contexts `(N, C)` of codes, targets `(N)` of codes, where
//! `N = Σ (len(name) + 1)`.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::path::Path;

use super::vocab::{Vocabulary, BOUNDARY_CODE};
use crate::error::{NamegenError, NamegenResult};

/// Normalize one corpus line: trim surrounding whitespace and lowercase.
#[must_use]
pub fn clean_name(line: &str) -> String {
    line.trim().to_lowercase()
}

/// Load a names file: one name per line, empty lines skipped.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read.
pub fn load_names(path: &Path) -> NamegenResult<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|source| NamegenError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(raw
        .lines()
        .map(clean_name)
        .filter(|name| !name.is_empty())
        .collect())
}

/// Count the examples a corpus would produce (without allocating matrices).
///
/// One per character plus one boundary-terminated example per name.
#[must_use]
pub fn count_examples<S: AsRef<str>>(corpus: &[S]) -> usize {
    corpus
        .iter()
        .map(|name| name.as_ref().chars().count() + 1)
        .sum()
}

/// Convert a corpus into `(contexts, targets)` training pairs.
///
/// For each name the context starts as `context_length` boundary codes. For each
/// character followed by one trailing boundary, the current context is emitted with
/// that character's code as target, then the context slides left by one and the
/// code is appended.
///
/// # Errors
///
/// - `InvalidContextLength` if `context_length < 1`
/// - `UnknownCharacter` if a name holds a character the vocabulary does not know
/// - `ReservedCharacter` if a name contains the boundary symbol
pub fn build_examples<S: AsRef<str>>(
    corpus: &[S],
    vocab: &Vocabulary,
    context_length: usize,
) -> NamegenResult<(Array2<usize>, Array1<usize>)> {
    if context_length < 1 {
        return Err(NamegenError::InvalidContextLength { context_length });
    }

    let n_examples = count_examples(corpus);
    let mut contexts = Array2::from_elem((n_examples, context_length), BOUNDARY_CODE);
    let mut targets = Array1::from_elem(n_examples, BOUNDARY_CODE);

    let mut row = 0;
    let mut window = vec![BOUNDARY_CODE; context_length];
    for name in corpus {
        window.fill(BOUNDARY_CODE);
        let codes = vocab.encode_name(name.as_ref())?;

        for code in codes.into_iter().chain(std::iter::once(BOUNDARY_CODE)) {
            contexts
                .row_mut(row)
                .assign(&ArrayView1::from(window.as_slice()));
            targets[row] = code;
            row += 1;

            window.rotate_left(1);
            window[context_length - 1] = code;
        }
    }

    debug_assert_eq!(row, n_examples);
    Ok((contexts, targets))
}

/// Split examples into training and evaluation sets.
///
/// Returns `(train_contexts, train_targets, eval_contexts, eval_targets)`.
/// The split is deterministic: the last `eval_fraction` of examples become eval.
#[must_use]
pub fn train_eval_split(
    contexts: &ArrayView2<usize>,
    targets: &ArrayView1<usize>,
    eval_fraction: f32,
) -> (Array2<usize>, Array1<usize>, Array2<usize>, Array1<usize>) {
    let n = contexts.len_of(Axis(0));
    let eval_count = (((n as f32) * eval_fraction.clamp(0.0, 1.0)) as usize).min(n);
    let train_count = n - eval_count;

    (
        contexts.slice(s![..train_count, ..]).to_owned(),
        targets.slice(s![..train_count]).to_owned(),
        contexts.slice(s![train_count.., ..]).to_owned(),
        targets.slice(s![train_count..]).to_owned(),
    )
}
