// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Validation problems and their textual report.

use core::fmt;

/// A single validation failure. Failures of combinator keywords (`anyOf`,
/// `oneOf`) carry one branch-group per alternative that was attempted, each
/// holding the failures found while evaluating that alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A failure with no alternatives to report.
    Leaf {
        /// Short description of the failure.
        message: String,
        /// The message prefixed with the location of the failing instance.
        context: String,
    },
    /// A combinator failure. Always holds at least one non-empty group when
    /// built through [Problem::branching].
    Branching { message: String, context: String, branches: Vec<Vec<Problem>> },
}

impl Problem {
    /// Creates a [Problem::Leaf].
    pub fn leaf<M: Into<String>, C: Into<String>>(message: M, context: C) -> Self {
        Problem::Leaf { message: message.into(), context: context.into() }
    }

    /// Creates a [Problem::Branching]. Empty branch-groups are dropped, and a
    /// [Problem::Leaf] is returned when no group is left.
    ///
    /// ```
    /// # use openc2_validate::problem::Problem;
    /// let p = Problem::branching("no match", "[/] no match", vec![vec![]]);
    /// assert!(p.is_leaf());
    /// ```
    pub fn branching<M: Into<String>, C: Into<String>>(
        message: M,
        context: C,
        branches: Vec<Vec<Problem>>,
    ) -> Self {
        let branches: Vec<_> = branches.into_iter().filter(|g| !g.is_empty()).collect();
        if branches.is_empty() {
            Problem::leaf(message, context)
        } else {
            Problem::Branching { message: message.into(), context: context.into(), branches }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Problem::Leaf { message, .. } | Problem::Branching { message, .. } => message,
        }
    }

    pub fn contextual_message(&self) -> &str {
        match self {
            Problem::Leaf { context, .. } | Problem::Branching { context, .. } => context,
        }
    }

    /// The branch-groups of this problem, empty for leaves.
    pub fn branches(&self) -> &[Vec<Problem>] {
        match self {
            Problem::Leaf { .. } => &[],
            Problem::Branching { branches, .. } => branches,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.branches().is_empty()
    }

    /// Renders the whole tree. Leaves render as their contextual message.
    /// Branching problems render their message followed by a numbered block
    /// per branch-group, with continuation lines aligned under the text
    /// following the number.
    ///
    /// ```
    /// # use openc2_validate::problem::Problem;
    /// let p = Problem::branching(
    ///     "no alternative matched",
    ///     "[/] no alternative matched",
    ///     vec![
    ///         vec![Problem::leaf("a", "[/x] a"), Problem::leaf("b", "[/y] b")],
    ///         vec![Problem::leaf("c", "[/] c")],
    ///     ],
    /// );
    /// assert_eq!(p.render(), "no alternative matched\n1) [/x] a\n   [/y] b\n2) [/] c");
    /// ```
    pub fn render(&self) -> String {
        if self.is_leaf() {
            return self.contextual_message().to_owned();
        }
        let mut lines = vec![self.message().to_owned()];
        push_groups(self.branches(), "", &mut lines);
        lines.join("\n")
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn push_groups(branches: &[Vec<Problem>], prefix: &str, lines: &mut Vec<String>) {
    for (index, group) in branches.iter().enumerate() {
        let label = format!("{prefix}{}) ", index + 1);
        let indent = " ".repeat(label.chars().count());
        for (position, problem) in group.iter().enumerate() {
            let lead = if position == 0 { &label } else { &indent };
            if problem.is_leaf() {
                lines.push(format!("{lead}{}", problem.contextual_message()));
            } else {
                lines.push(format!("{lead}{}", problem.message()));
                push_groups(problem.branches(), &indent, lines);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn leaf(name: &str) -> Problem {
        Problem::leaf(name, format!("[/{name}] {name}"))
    }

    fn count_nodes(problem: &Problem) -> usize {
        problem.branches().iter().flatten().map(|p| 1 + count_nodes(p)).sum()
    }

    #[test]
    fn test_leaf_renders_context() {
        let p = Problem::leaf("\"action\" is a required property", "[/] \"action\" is a required property");
        assert_eq!(p.render(), "[/] \"action\" is a required property");
        assert_eq!(p.to_string(), p.render());
    }

    #[test]
    fn test_empty_branches_is_leaf() {
        let p = Problem::branching("m", "[/] m", vec![]);
        assert_eq!(p, Problem::leaf("m", "[/] m"));
        assert_eq!(p.render(), "[/] m");

        let p = Problem::Branching { message: "m".into(), context: "[/] m".into(), branches: vec![] };
        assert_eq!(p.render(), "[/] m");
    }

    #[test]
    fn test_empty_groups_dropped() {
        let p = Problem::branching("m", "[/] m", vec![vec![], vec![leaf("a")], vec![]]);
        assert_eq!(p.branches().len(), 1);
        assert_eq!(p.render(), "m\n1) [/a] a");
    }

    #[test]
    fn test_nested_indent() {
        let p = Problem::branching(
            "outer",
            "[/] outer",
            vec![
                vec![leaf("a")],
                vec![
                    leaf("b"),
                    Problem::branching(
                        "inner",
                        "[/t] inner",
                        vec![vec![leaf("c")], vec![leaf("d"), leaf("e")]],
                    ),
                ],
            ],
        );
        let expected = [
            "outer",
            "1) [/a] a",
            "2) [/b] b",
            "   inner",
            "   1) [/c] c",
            "   2) [/d] d",
            "      [/e] e",
        ]
        .join("\n");
        assert_eq!(p.render(), expected);
    }

    #[test]
    fn test_nested_first_child_branching() {
        let p = Problem::branching(
            "outer",
            "[/] outer",
            vec![vec![Problem::branching("inner", "[/] inner", vec![vec![leaf("a")]])]],
        );
        assert_eq!(p.render(), "outer\n1) inner\n   1) [/a] a");
    }

    #[test]
    fn test_wide_label_alignment() {
        let groups: Vec<Vec<Problem>> =
            (0..10).map(|i| vec![leaf(&format!("x{i}")), leaf(&format!("y{i}"))]).collect();
        let rendered = Problem::branching("m", "[/] m", groups).render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[19], "10) [/x9] x9");
        assert_eq!(lines[20], "    [/y9] y9");
        assert_eq!(lines[2], "   [/y0] y0");
    }

    #[test]
    fn test_line_count() {
        let flat = Problem::branching(
            "m",
            "[/] m",
            vec![vec![leaf("a"), leaf("b")], vec![leaf("c")], vec![leaf("d")]],
        );
        assert_eq!(flat.render().lines().count(), 1 + 4);

        let nested = Problem::branching(
            "m",
            "[/] m",
            vec![
                vec![Problem::branching("n", "[/] n", vec![vec![leaf("a")], vec![leaf("b")]])],
                vec![leaf("c")],
            ],
        );
        assert_eq!(nested.render().lines().count(), 1 + count_nodes(&nested));
    }

    #[test]
    fn test_every_leaf_once() {
        let p = Problem::branching(
            "m",
            "[/] m",
            vec![
                vec![leaf("alpha"), Problem::branching("n", "[/] n", vec![vec![leaf("beta")]])],
                vec![leaf("gamma")],
            ],
        );
        let rendered = p.render();
        for name in ["[/alpha] alpha", "[/beta] beta", "[/gamma] gamma"] {
            assert_eq!(rendered.matches(name).count(), 1, "{name} in\n{rendered}");
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let p = Problem::branching("m", "[/] m", vec![vec![leaf("a")], vec![leaf("b")]]);
        assert_eq!(p.render(), p.render());
    }
}
