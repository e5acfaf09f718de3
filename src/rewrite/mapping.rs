//! Prefix substitution over a virtual dataset's mapping list.

use crate::container::SourceMapping;

/// Apply a source-path prefix substitution to a mapping list.
///
/// Each mapping's source-file path is searched for the first occurrence
/// of `from`; if present, that occurrence (and only that one) is replaced
/// with `to`. A mapping counts as substituted only when the resulting
/// path actually differs from the original, which keeps the degenerate
/// cases (`from` empty, `from == to`) out of the count. Dataset paths and
/// both selections are carried over untouched, and the output preserves
/// the input's length and order exactly.
///
/// Returns the rewritten list and the substitution count. A caller seeing
/// a zero count must discard the list and leave the object alone.
pub fn rewrite_mappings(
    mappings: &[SourceMapping],
    from: &str,
    to: &str,
) -> (Vec<SourceMapping>, usize) {
    let mut out = Vec::with_capacity(mappings.len());
    let mut count = 0;

    for mapping in mappings {
        let rewritten = match mapping.source_file.find(from) {
            Some(pos) => {
                let tail = &mapping.source_file[pos + from.len()..];
                let mut path =
                    String::with_capacity(pos + to.len() + tail.len());
                path.push_str(&mapping.source_file[..pos]);
                path.push_str(to);
                path.push_str(tail);
                path
            }
            None => mapping.source_file.clone(),
        };
        if rewritten != mapping.source_file {
            count += 1;
        }
        out.push(SourceMapping {
            source_file: rewritten,
            source_dataset: mapping.source_dataset.clone(),
            src_selection: mapping.src_selection.clone(),
            dst_selection: mapping.dst_selection.clone(),
        });
    }

    (out, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Selection;

    fn mapping(file: &str) -> SourceMapping {
        SourceMapping {
            source_file: file.into(),
            source_dataset: "ds".into(),
            src_selection: Selection::Hyperslab {
                start: vec![0],
                count: vec![16],
            },
            dst_selection: Selection::All,
        }
    }

    #[test]
    fn replaces_prefix_and_counts_it() {
        let (out, count) =
            rewrite_mappings(&[mapping("/data/old/a.vdsc")], "/data/old", "/data/new");
        assert_eq!(count, 1);
        assert_eq!(out[0].source_file, "/data/new/a.vdsc");
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let (out, count) = rewrite_mappings(&[mapping("/old/nested/old/a.vdsc")], "/old", "/new");
        assert_eq!(count, 1);
        assert_eq!(out[0].source_file, "/new/nested/old/a.vdsc");
    }

    #[test]
    fn infix_match_replaces_at_its_position() {
        let (out, _) = rewrite_mappings(&[mapping("/data/old/a.vdsc")], "old", "ancient");
        assert_eq!(out[0].source_file, "/data/ancient/a.vdsc");
    }

    #[test]
    fn non_matching_mapping_passes_through() {
        let (out, count) = rewrite_mappings(&[mapping("/elsewhere/a.vdsc")], "/data/old", "/new");
        assert_eq!(count, 0);
        assert_eq!(out[0].source_file, "/elsewhere/a.vdsc");
    }

    #[test]
    fn empty_from_prefix_is_not_counted() {
        // "" matches at position 0 in every path; inserting "" back is a
        // no-op and must not count as a substitution.
        let (out, count) = rewrite_mappings(&[mapping("/data/a.vdsc")], "", "");
        assert_eq!(count, 0);
        assert_eq!(out[0].source_file, "/data/a.vdsc");
    }

    #[test]
    fn identical_from_and_to_are_not_counted() {
        let (_, count) = rewrite_mappings(&[mapping("/data/a.vdsc")], "/data", "/data");
        assert_eq!(count, 0);
    }

    #[test]
    fn empty_from_with_nonempty_to_prepends_and_counts() {
        let (out, count) = rewrite_mappings(&[mapping("data/a.vdsc")], "", "/mnt/");
        assert_eq!(count, 1);
        assert_eq!(out[0].source_file, "/mnt/data/a.vdsc");
    }

    #[test]
    fn order_length_and_selections_survive() {
        let input = vec![
            mapping("/data/old/a.vdsc"),
            mapping("/elsewhere/b.vdsc"),
            mapping("/data/old/c.vdsc"),
        ];
        let (out, count) = rewrite_mappings(&input, "/data/old", "/data/new");
        assert_eq!(count, 2);
        assert_eq!(out.len(), input.len());
        assert_eq!(out[0].source_file, "/data/new/a.vdsc");
        assert_eq!(out[1].source_file, "/elsewhere/b.vdsc");
        assert_eq!(out[2].source_file, "/data/new/c.vdsc");
        for (rewritten, original) in out.iter().zip(&input) {
            assert_eq!(rewritten.source_dataset, original.source_dataset);
            assert_eq!(rewritten.src_selection, original.src_selection);
            assert_eq!(rewritten.dst_selection, original.dst_selection);
        }
    }
}
