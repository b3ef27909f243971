/// A node of a page's section tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Section {
    pub title: String,
    pub text: String,
    pub children: Vec<Section>,
}

/// Depth-first, pre-order search for the first section titled exactly `label`.
pub fn find_section<'a>(sections: &'a [Section], label: &str) -> Option<&'a Section> {
    let mut stack: Vec<&Section> = sections.iter().rev().collect();
    while let Some(section) = stack.pop() {
        if section.title == label {
            return Some(section);
        }
        stack.extend(section.children.iter().rev());
    }
    None
}

struct Open {
    level: usize,
    section: Section,
    lines: Vec<String>,
}

impl Open {
    fn finish(mut self) -> Section {
        self.section.text = self.lines.join("\n").trim().to_string();
        self.section
    }
}

/// Builds a section tree from a plain-text extract with wiki-style headings
/// (`== Title ==`, `=== Sub ===`). Text before the first heading is the page
/// intro and belongs to no section.
pub fn parse_sections(extract: &str) -> Vec<Section> {
    let mut roots = Vec::new();
    let mut stack: Vec<Open> = Vec::new();

    for line in extract.lines() {
        if let Some((level, title)) = parse_heading(line) {
            while stack.last().is_some_and(|open| open.level >= level) {
                close_top(&mut stack, &mut roots);
            }
            stack.push(Open {
                level,
                section: Section {
                    title: title.to_string(),
                    ..Section::default()
                },
                lines: Vec::new(),
            });
        } else if let Some(open) = stack.last_mut() {
            open.lines.push(line.to_string());
        }
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }
    roots
}

fn close_top(stack: &mut Vec<Open>, roots: &mut Vec<Section>) {
    let Some(open) = stack.pop() else { return };
    let section = open.finish();
    match stack.last_mut() {
        Some(parent) => parent.section.children.push(section),
        None => roots.push(section),
    }
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let line = line.trim();
    let level = line.chars().take_while(|&c| c == '=').count();
    let trailing = line.chars().rev().take_while(|&c| c == '=').count();
    if level < 2 || trailing < 2 || line.len() <= level + trailing {
        return None;
    }
    let title = line[level..line.len() - trailing].trim();
    if title.is_empty() { None } else { Some((level, title)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRACT: &str = "機械学習は人工知能の一分野である。\n\n\
== 概要 ==\n機械学習の概要。\n\n\
=== 定義 ===\n定義の説明。\n\n\
==== 関連項目 ====\n入れ子の項目\n\n\
== 関連項目 ==\nデータマイニング\n深層学習\n\n\
== 外部リンク ==\nリンク";

    #[test]
    fn builds_nested_tree() {
        let sections = parse_sections(EXTRACT);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["概要", "関連項目", "外部リンク"]);

        let overview = &sections[0];
        assert_eq!(overview.text, "機械学習の概要。");
        assert_eq!(overview.children.len(), 1);
        assert_eq!(overview.children[0].title, "定義");
        assert_eq!(overview.children[0].children[0].title, "関連項目");
    }

    #[test]
    fn intro_belongs_to_no_section() {
        let sections = parse_sections(EXTRACT);
        assert!(sections.iter().all(|s| !s.text.contains("一分野")));
    }

    #[test]
    fn section_text_keeps_lines() {
        let sections = parse_sections(EXTRACT);
        assert_eq!(sections[1].text, "データマイニング\n深層学習");
    }

    #[test]
    fn find_section_is_depth_first_preorder() {
        let sections = parse_sections(EXTRACT);
        let found = find_section(&sections, "関連項目").unwrap();
        assert_eq!(found.text, "入れ子の項目");
    }

    #[test]
    fn find_section_reaches_any_depth() {
        let tree = vec![Section {
            title: "A".into(),
            text: String::new(),
            children: vec![Section {
                title: "B".into(),
                text: String::new(),
                children: vec![Section {
                    title: "See also".into(),
                    text: "Deep learning".into(),
                    children: vec![],
                }],
            }],
        }];
        assert_eq!(find_section(&tree, "See also").unwrap().text, "Deep learning");
    }

    #[test]
    fn find_section_requires_exact_title() {
        let sections = parse_sections("== See also ==\nx");
        assert!(find_section(&sections, "see also").is_none());
        assert!(find_section(&sections, "See").is_none());
    }

    #[test]
    fn no_headings_means_no_sections() {
        assert!(parse_sections("just an intro\nwith two lines").is_empty());
        assert!(parse_sections("").is_empty());
    }

    #[test]
    fn rejects_malformed_headings() {
        assert_eq!(parse_heading("= Title ="), None);
        assert_eq!(parse_heading("===="), None);
        assert_eq!(parse_heading("== =="), None);
        assert_eq!(parse_heading("a == b =="), None);
        assert_eq!(parse_heading("  == Title ==  "), Some((2, "Title")));
    }
}
