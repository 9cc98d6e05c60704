//! Minimal Gemfile reader.
//!
//! Extracts the runtime gems (those outside development/test groups) with
//! their version requirements. It understands `gem` lines, `group ... do`
//! blocks, and `group:`/`groups:` options; anything else is ignored.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A runtime gem and its version requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemDependency {
    pub name: String,
    #[serde(default)]
    pub version: Vec<String>,
}

static GEM_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^gem[\s(]+(.*?)\)?$").expect("valid gem regex"));
static GROUP_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^group[\s(]+(.*?)\)?\s+do(\s*\|[^|]*\|)?$").expect("valid group regex")
});
static BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdo(\s*\|[^|]*\|)?$").expect("valid block regex"));
static BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^end\b").expect("valid end regex"));
static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?::(\w+)\s*=>|(\w+):)\s*(.*)$").expect("valid option regex")
});
static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":(\w+)|"([^"]*)"|'([^']*)'"#).expect("valid name regex")
});

/// Parse Gemfile contents into its runtime dependencies, in file order.
pub fn parse_gemfile(content: &str) -> Vec<GemDependency> {
    // One entry per open block: the groups it declares (empty for
    // non-group blocks such as `platforms` or `source ... do`).
    let mut blocks: Vec<Vec<String>> = Vec::new();
    let mut gems = Vec::new();

    for raw in content.lines() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if BLOCK_END.is_match(line) {
            blocks.pop();
            continue;
        }

        if let Some(caps) = GROUP_BLOCK.captures(line) {
            blocks.push(names(&caps[1]));
            continue;
        }

        if let Some(caps) = GEM_LINE.captures(line) {
            let enclosing: Vec<String> = blocks.iter().flatten().cloned().collect();
            if let Some((gem, groups)) = parse_gem_args(strip_modifier(&caps[1])) {
                let groups = if groups.is_empty() { enclosing } else { groups };
                if is_runtime(&groups) {
                    gems.push(gem);
                }
            }
            if BLOCK_START.is_match(line) {
                blocks.push(Vec::new());
            }
            continue;
        }

        if BLOCK_START.is_match(line) {
            blocks.push(Vec::new());
        }
    }

    gems
}

fn is_runtime(groups: &[String]) -> bool {
    groups.is_empty() || groups.iter().any(|g| g == "default")
}

fn parse_gem_args(args: &str) -> Option<(GemDependency, Vec<String>)> {
    let mut parts = split_args(args).into_iter();
    let name = unquote(&parts.next()?)?;
    let mut version = Vec::new();
    let mut groups = Vec::new();

    for part in parts {
        if let Some(caps) = OPTION.captures(&part) {
            let key = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            if matches!(key, Some("group") | Some("groups")) {
                groups.extend(names(&caps[3]));
            }
        } else if let Some(requirement) = unquote(&part) {
            version.push(requirement);
        }
    }

    Some((GemDependency { name, version }, groups))
}

// Split on commas that are not inside quotes or brackets.
fn split_args(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for c in args.chars() {
        match (c, quote) {
            ('"' | '\'', None) => {
                quote = Some(c);
                current.push(c);
            }
            (c, Some(q)) if c == q => {
                quote = None;
                current.push(c);
            }
            ('[' | '{', None) => {
                depth += 1;
                current.push(c);
            }
            (']' | '}', None) => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            (',', None) if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

// Drop a trailing `if ...` / `unless ...` modifier, and the closing paren
// it leaves behind in `gem(...) if cond`.
fn strip_modifier(args: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut previous = ' ';

    for (i, c) in args.char_indices() {
        match (c, quote) {
            ('"' | '\'', None) => quote = Some(c),
            (c, Some(q)) if c == q => quote = None,
            ('[' | '{' | '(', None) => depth += 1,
            (']' | '}' | ')', None) => depth = depth.saturating_sub(1),
            (_, None) if depth == 0 && previous.is_whitespace() => {
                let rest = &args[i..];
                if ["if", "unless"].iter().any(|kw| {
                    rest.strip_prefix(kw)
                        .is_some_and(|after| after.starts_with(char::is_whitespace))
                }) {
                    let head = args[..i].trim_end();
                    return head.strip_suffix(')').unwrap_or(head).trim_end();
                }
            }
            _ => {}
        }
        previous = c;
    }
    args
}

fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match (c, quote) {
            ('"' | '\'', None) => quote = Some(c),
            (c, Some(q)) if c == q => quote = None,
            ('#', None) => return &line[..i],
            _ => {}
        }
    }
    line
}

fn unquote(value: &str) -> Option<String> {
    let value = value.trim();
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    quoted.then(|| value[1..value.len() - 1].to_string())
}

// Symbol or string names in a group list: `:development, "test"`.
fn names(list: &str) -> Vec<String> {
    NAME.captures_iter(list)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem(name: &str, version: &[&str]) -> GemDependency {
        GemDependency {
            name: name.to_string(),
            version: version.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn parses_simple_gems_with_requirements() {
        let gems = parse_gemfile(
            r#"
source "https://rubygems.org"

gem "jekyll", "~> 4.3"
gem 'webrick'
gem "nokogiri", ">= 1.15", "< 2.0"
"#,
        );

        assert_eq!(
            gems,
            vec![
                gem("jekyll", &["~> 4.3"]),
                gem("webrick", &[]),
                gem("nokogiri", &[">= 1.15", "< 2.0"]),
            ]
        );
    }

    #[test]
    fn excludes_group_blocks() {
        let gems = parse_gemfile(
            r#"
gem "rails", "7.1.0"

group :development, :test do
  gem "rspec-rails"
end

group :test do
  gem "capybara"
end

gem "puma"
"#,
        );

        assert_eq!(gems, vec![gem("rails", &["7.1.0"]), gem("puma", &[])]);
    }

    #[test]
    fn excludes_inline_group_options() {
        let gems = parse_gemfile(
            r#"
gem "pry", group: :development
gem "rubocop", require: false, groups: [:development, :test]
gem "minitest", :group => :test
gem "rack", require: false
"#,
        );

        assert_eq!(gems, vec![gem("rack", &[])]);
    }

    #[test]
    fn default_group_is_runtime() {
        let gems = parse_gemfile(
            r#"
group :default do
  gem "sinatra"
end
"#,
        );

        assert_eq!(gems, vec![gem("sinatra", &[])]);
    }

    #[test]
    fn non_group_blocks_stay_runtime() {
        let gems = parse_gemfile(
            r#"
platforms :jruby do
  gem "jruby-openssl"
end

group :development do
  platforms :mri do
    gem "byebug"
  end
end

gem "json"
"#,
        );

        assert_eq!(gems, vec![gem("jruby-openssl", &[]), gem("json", &[])]);
    }

    #[test]
    fn ignores_comments() {
        let gems = parse_gemfile(
            r#"
# gem "commented-out"
gem "kramdown" # markdown
gem "tag#hash", "1.0"
"#,
        );

        assert_eq!(gems, vec![gem("kramdown", &[]), gem("tag#hash", &["1.0"])]);
    }

    #[test]
    fn parenthesised_gem_calls() {
        let gems = parse_gemfile("gem(\"rouge\", \"~> 3.0\")\n");
        assert_eq!(gems, vec![gem("rouge", &["~> 3.0"])]);
    }

    #[test]
    fn unquoted_names_are_skipped() {
        let gems = parse_gemfile("gem name_from_variable\n");
        assert!(gems.is_empty());
    }

    #[test]
    fn trailing_conditions_keep_requirements() {
        let gems = parse_gemfile(
            r#"
gem "wdm", ">= 0.1.0" if Gem.win_platform?
gem("tzinfo-data", "~> 1.2") unless RUBY_PLATFORM =~ /linux/
gem "verified", "1.0", require: "verify"
"#,
        );

        assert_eq!(
            gems,
            vec![
                gem("wdm", &[">= 0.1.0"]),
                gem("tzinfo-data", &["~> 1.2"]),
                gem("verified", &["1.0"]),
            ]
        );
    }
}
