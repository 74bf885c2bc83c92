//! Board and thread locators.

/// Identifies what a subscription watches: a board's catalog, or a single
/// thread on a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    board: String,
    thread: Option<u64>,
}

impl Target {
    /// Locator for a board catalog. Path-separator characters are stripped
    /// from the board name.
    #[must_use]
    pub fn catalog(board: &str) -> Self {
        Self {
            board: sanitize_board(board),
            thread: None,
        }
    }

    /// Locator for a single thread on a board.
    #[must_use]
    pub fn thread(board: &str, no: u64) -> Self {
        Self {
            board: sanitize_board(board),
            thread: Some(no),
        }
    }

    /// The sanitized board name.
    #[must_use]
    pub fn board(&self) -> &str {
        &self.board
    }

    /// The thread number, when watching a single thread.
    #[must_use]
    pub fn thread_no(&self) -> Option<u64> {
        self.thread
    }

    /// Builds the request URL under `base` (no trailing slash).
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        match self.thread {
            Some(no) => format!("{base}/{}/thread/{no}.json", self.board),
            None => format!("{base}/{}/catalog.json", self.board),
        }
    }
}

/// Strips path-separator characters so a board name cannot traverse the
/// request path.
fn sanitize_board(board: &str) -> String {
    board
        .trim()
        .chars()
        .filter(|c| *c != '/' && *c != '\\')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_url() {
        let target = Target::catalog("ck");
        assert_eq!(target.url("http://a.4cdn.org"), "http://a.4cdn.org/ck/catalog.json");
        assert_eq!(target.board(), "ck");
        assert_eq!(target.thread_no(), None);
    }

    #[test]
    fn thread_url() {
        let target = Target::thread("ck", 1234);
        assert_eq!(
            target.url("https://a.4cdn.org"),
            "https://a.4cdn.org/ck/thread/1234.json"
        );
        assert_eq!(target.thread_no(), Some(1234));
    }

    #[test]
    fn board_name_is_stripped_of_path_separators() {
        assert_eq!(Target::catalog("/ck/").board(), "ck");
        assert_eq!(Target::catalog("\\g").board(), "g");
        assert_eq!(Target::catalog(" tv ").board(), "tv");
    }

    #[test]
    fn separator_only_board_collapses_to_empty() {
        assert_eq!(Target::catalog("//").board(), "");
    }
}
