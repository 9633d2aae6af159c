//! Property-based tests for the Podfile rewrites.
//!
//! Generated Podfiles mix free-form user lines with target blocks, some of
//! them nested, so the scanner and both rewrites see shapes no hand-written
//! fixture covers.

#[cfg(test)]
mod proptest_tests {
    use crate::config::{ModuleEntry, ProjectConfig};
    use crate::document::TextDocument;
    use crate::injector::{FixedAnswer, ScriptedOracle, TargetInjector};
    use crate::pipeline::rewrite_podfile;
    use crate::region::{
        rewrite_owned_region, ModuleLayout, RegionRewrite, REGION_END_LINE, REGION_START_LINE,
    };
    use crate::scanner::{find_next_uninjected_target, target_blocks, tokenize_line, Token};
    use proptest::prelude::*;

    fn manifest(modules: Vec<String>, dev_modules: Vec<String>) -> ProjectConfig {
        let entry = |name: String| {
            let git = format!("https://git.example.com/{}.git", name);
            ModuleEntry::new(name, git)
        };
        ProjectConfig {
            name: "shop".to_string(),
            desc: None,
            version: "1.0.0".to_string(),
            modules: modules.into_iter().map(entry).collect(),
            dev_modules: dev_modules.into_iter().map(entry).collect(),
        }
    }

    /// Lines a user might write that are neither markers nor block syntax.
    fn user_line() -> impl Strategy<Value = String> {
        "[a-z_ :',=0-9]{0,24}".prop_filter("no airone tokens or block syntax", |line| {
            !line.contains("airone") && tokenize_line(line) == Token::Plain
        })
    }

    fn config_strategy() -> impl Strategy<Value = ProjectConfig> {
        (
            prop::collection::btree_set("M[a-z]{1,6}", 0..4),
            prop::collection::btree_set("D[a-z]{1,6}", 0..3),
        )
            .prop_map(|(modules, dev_modules)| {
                manifest(modules.into_iter().collect(), dev_modules.into_iter().collect())
            })
    }

    /// A Podfile made of user lines and target blocks. Each target holds a
    /// few user lines and, sometimes, one nested target.
    fn podfile_strategy() -> impl Strategy<Value = String> {
        let target = (
            "[A-Z][a-zA-Z]{0,8}",
            prop::collection::vec(user_line(), 0..3),
            prop::option::of("[A-Z][a-zA-Z]{0,8}Tests"),
        )
            .prop_map(|(name, body, nested)| {
                let mut lines = vec![format!("target '{}' do", name)];
                lines.extend(body.into_iter().map(|l| format!("  {}", l.trim())));
                if let Some(nested) = nested {
                    lines.push(format!("  target '{}' do", nested));
                    lines.push("    inherit! :search_paths".to_string());
                    lines.push("  end".to_string());
                }
                lines.push("end".to_string());
                lines.join("\n")
            });

        (
            prop::collection::vec(user_line(), 0..4),
            prop::collection::vec(target, 0..4),
            any::<bool>(),
        )
            .prop_map(|(header, targets, trailing_newline)| {
                let mut parts = header;
                parts.extend(targets);
                let mut text = parts.join("\n");
                if trailing_newline {
                    text.push('\n');
                }
                text
            })
    }

    proptest! {
        /// Property: rewriting an existing region never touches the lines
        /// outside its markers.
        #[test]
        fn region_rewrite_leaves_outside_lines_alone(
            before in prop::collection::vec(user_line(), 0..6),
            stale in prop::collection::vec(user_line(), 0..6),
            after in prop::collection::vec(user_line(), 0..6),
            config in config_strategy(),
        ) {
            let mut lines = before.clone();
            lines.push(REGION_START_LINE.to_string());
            lines.extend(stale);
            lines.push(REGION_END_LINE.to_string());
            lines.extend(after.clone());
            let mut doc = TextDocument::parse(&lines.join("\n"));

            let outcome = rewrite_owned_region(&mut doc, &config, &ModuleLayout::default()).unwrap();
            prop_assert_eq!(outcome, RegionRewrite::Replaced);

            let result = doc.lines();
            prop_assert_eq!(&result[..before.len()], before.as_slice());
            prop_assert_eq!(&result[result.len() - after.len()..], after.as_slice());
        }

        /// Property: the region depends only on the latest manifest, not on
        /// what earlier runs generated.
        #[test]
        fn region_rewrite_forgets_earlier_manifests(
            podfile in podfile_strategy(),
            first in config_strategy(),
            second in config_strategy(),
        ) {
            let layout = ModuleLayout::default();

            let mut direct = TextDocument::parse(&podfile);
            rewrite_owned_region(&mut direct, &second, &layout).unwrap();

            let mut via_first = TextDocument::parse(&podfile);
            rewrite_owned_region(&mut via_first, &first, &layout).unwrap();
            rewrite_owned_region(&mut via_first, &second, &layout).unwrap();

            prop_assert_eq!(direct.to_string(), via_first.to_string());
        }

        /// Property: after one full rewrite, a second run asks nothing and
        /// changes nothing, whatever the first run answered.
        #[test]
        fn full_rewrite_is_idempotent(
            podfile in podfile_strategy(),
            config in config_strategy(),
            answer in any::<bool>(),
        ) {
            let layout = ModuleLayout::default();
            let mut doc = TextDocument::parse(&podfile);
            rewrite_podfile(&mut doc, &config, &layout, FixedAnswer(answer)).unwrap();
            let first = doc.to_string();

            let mut oracle = ScriptedOracle::default();
            let (_, report) = rewrite_podfile(&mut doc, &config, &layout, &mut oracle).unwrap();

            prop_assert!(report.is_empty());
            prop_assert!(oracle.asked().is_empty());
            prop_assert_eq!(doc.to_string(), first);
        }

        /// Property: injection asks exactly once per target and leaves no
        /// target unmarked.
        #[test]
        fn injection_converges_with_one_question_per_target(
            podfile in podfile_strategy(),
            answers in prop::collection::vec(any::<bool>(), 8),
        ) {
            let mut doc = TextDocument::parse(&podfile);
            let target_count = target_blocks(&doc).len();

            let mut oracle = ScriptedOracle::new(answers);
            let report = TargetInjector::new(&mut oracle).run(&mut doc).unwrap();

            prop_assert_eq!(report.decisions.len(), target_count);
            prop_assert_eq!(oracle.asked().len(), target_count);
            prop_assert_eq!(target_blocks(&doc).len(), target_count);
            prop_assert!(find_next_uninjected_target(&doc).is_none());
        }
    }
}
