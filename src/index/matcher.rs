use std::io;
use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

// 排除模式集合，編譯一次後供所有工作執行緒唯讀共用。
// `**` 可跨越任意層路徑段，`*` 與 `?` 不跨越分隔符，隱藏檔案不做特殊處理。
pub struct ExclusionMatcher {
    set: GlobSet,
}

impl ExclusionMatcher {
    pub fn compile(patterns: &[String]) -> io::Result<ExclusionMatcher> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("無效的排除模式 '{}'：{}", pattern, e),
                    )
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("無效的排除模式集：{}", e))
        })?;
        Ok(ExclusionMatcher { set })
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(patterns: &[&str]) -> ExclusionMatcher {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        ExclusionMatcher::compile(&patterns).unwrap()
    }

    #[test]
    fn empty_pattern_set_matches_nothing() {
        let matcher = compile(&[]);
        assert!(matcher.is_empty());
        assert!(!matcher.is_match(Path::new("/data/a/x")));
    }

    #[test]
    fn double_star_spans_any_number_of_segments() {
        let matcher = compile(&["**/y"]);
        assert!(matcher.is_match(Path::new("y")));
        assert!(matcher.is_match(Path::new("/data/a/y")));
        assert!(!matcher.is_match(Path::new("/data/a/y2")));

        let matcher = compile(&["a/**/b"]);
        assert!(matcher.is_match(Path::new("a/b")));
        assert!(matcher.is_match(Path::new("a/x/y/b")));
        assert!(!matcher.is_match(Path::new("a/x/c")));
    }

    #[test]
    fn single_star_stays_within_one_segment() {
        let matcher = compile(&["/tmp/*.log"]);
        assert!(matcher.is_match(Path::new("/tmp/a.log")));
        assert!(!matcher.is_match(Path::new("/tmp/sub/a.log")));
    }

    #[test]
    fn patterns_match_full_paths_not_basenames() {
        let matcher = compile(&["y"]);
        assert!(matcher.is_match(Path::new("y")));
        assert!(!matcher.is_match(Path::new("/data/a/y")));
    }

    #[test]
    fn hidden_entries_are_not_special() {
        let matcher = compile(&["**/.cache", "**/*.log"]);
        assert!(matcher.is_match(Path::new("/home/user/.cache")));
        assert!(matcher.is_match(Path::new("/var/log/.hidden.log")));
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        let result = ExclusionMatcher::compile(&["a[".to_string()]);
        let err = result.err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
