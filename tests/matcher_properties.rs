// tests/matcher_properties.rs

use std::path::Path;
use std::sync::Arc;

use leaf::fs::mock::MockFileSystem;
use leaf::watch::{FilterSet, PathMatcher};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,6}"
}

fn abs_path() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 1..5).prop_map(|segs| format!("/{}", segs.join("/")))
}

proptest! {
    #[test]
    fn empty_pattern_never_matches(path in abs_path()) {
        let fs = MockFileSystem::new();
        let m = PathMatcher::new(Path::new(""));
        prop_assert!(!m.matches(&fs, Path::new(&path)));
    }

    #[test]
    fn directory_prefix_matches_everything_below(dir in abs_path(), rest in abs_path()) {
        let fs = MockFileSystem::new();
        fs.add_dir(&dir);
        let m = PathMatcher::new(Path::new(&dir));
        let child = format!("{dir}{rest}");
        prop_assert!(m.matches(&fs, Path::new(&child)));
        prop_assert!(m.matches(&fs, Path::new(&dir)));
    }

    #[test]
    fn appended_suffix_is_not_a_child(dir in abs_path(), suffix in segment()) {
        let fs = MockFileSystem::new();
        fs.add_dir(&dir);
        let m = PathMatcher::new(Path::new(&dir));
        let sibling = format!("{dir}{suffix}");
        prop_assert!(!m.matches(&fs, Path::new(&sibling)));
    }

    #[test]
    fn exclude_always_wins(dir in abs_path(), rest in abs_path()) {
        let fs = MockFileSystem::new();
        fs.add_dir(&dir);
        let include = format!("+{dir}");
        let exclude = format!("-{dir}");
        let set = FilterSet::with_fs(&[include, exclude], Path::new("/"), Arc::new(fs)).unwrap();
        let child = format!("{dir}{rest}");
        prop_assert!(!set.should_handle(Path::new(&child)));
    }

    #[test]
    fn no_filters_handle_everything(path in abs_path()) {
        let set = FilterSet::allow_all();
        prop_assert!(set.should_handle(Path::new(&path)));
    }
}
