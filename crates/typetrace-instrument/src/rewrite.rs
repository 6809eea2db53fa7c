//! Byte-splice application of collected injections.

/// One pending text insertion at an original byte offset.
#[derive(Debug, Clone)]
pub struct Injection {
    pub pos: usize,
    pub text: String,
}

/// Apply all injections to the source in one pass.
///
/// Insertions are ordered by position; when two injections share a
/// position, the later-collected one lands first in the output. The walk
/// visits enclosing functions before nested ones, so this keeps the
/// closers of nested expression-arrow rewrites properly nested.
pub fn apply_injections(source: &str, injections: Vec<Injection>) -> String {
    let mut indexed: Vec<(usize, usize, String)> = injections
        .into_iter()
        .enumerate()
        .map(|(seq, injection)| (injection.pos, seq, injection.text))
        .collect();
    indexed.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut out = String::with_capacity(source.len() + indexed.iter().map(|i| i.2.len()).sum::<usize>());
    let mut last = 0;
    for (pos, _, text) in indexed {
        out.push_str(&source[last..pos]);
        out.push_str(&text);
        last = pos;
    }
    out.push_str(&source[last..]);
    out
}
