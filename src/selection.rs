/// What the user asked for at the version prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Empty input: start the newest installation.
    Latest,
    Quit,
    /// Change the installation directory.
    Configure,
    /// 1-based position in the catalog.
    SelectOrdinal(usize),
    Invalid,
}

pub fn classify(input: &str, catalog_len: usize) -> Choice {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "" => Choice::Latest,
        "q" | "quit" | "exit" => Choice::Quit,
        "c" | "config" | "p" | "path" => Choice::Configure,
        other => match other.parse::<usize>() {
            Ok(n) if (1..=catalog_len).contains(&n) => Choice::SelectOrdinal(n),
            _ => Choice::Invalid,
        },
    }
}
