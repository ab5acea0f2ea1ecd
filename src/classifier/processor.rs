//! Asset Classifier
//! 按 `.` 与 `-` 切分域名，要求分量完全相等，避免 developer.mil 被标记为 dev

use std::collections::HashSet;

use tracing::debug;

use crate::model::Asset;

/// 暗示旧系统或敏感入口的默认标签
pub const DEFAULT_TAG_PATTERNS: &[&str] = &[
    "legacy",
    "old",
    "dev",
    "test",
    "staging",
    "portal",
    "webmail",
    "owa",
    "vpn",
    "remote",
    "admin",
    "training",
];

/// 已知会造成误报的子串，包含这些子串的域名不打标签也不参与过滤
pub const FALSE_POSITIVES: &[&str] = &["devens"];

/// 分类器
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    filters: Vec<String>,
}

impl Classifier {
    /// 过滤模式会去空白、转小写，空模式被丢弃
    pub fn new<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filters = filters
            .into_iter()
            .map(|f| f.as_ref().trim().to_lowercase())
            .filter(|f| !f.is_empty())
            .collect();
        Self { filters }
    }

    /// 解析逗号分隔的过滤列表
    pub fn from_csv(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// dedupe → tag → filter
    pub fn process(&self, assets: Vec<Asset>) -> Vec<Asset> {
        let before = assets.len();
        let assets = Self::tag(Self::dedupe(assets));
        let assets = if self.filters.is_empty() {
            assets
        } else {
            self.filter(assets)
        };
        debug!("classifier kept {} of {} assets", assets.len(), before);
        assets
    }

    /// 保留每个域名的首次出现，保持输入顺序
    pub fn dedupe(assets: Vec<Asset>) -> Vec<Asset> {
        let mut seen = HashSet::new();
        assets
            .into_iter()
            .filter(|asset| seen.insert(asset.domain.clone()))
            .collect()
    }

    /// 为每个资产追加命中的默认标签
    pub fn tag(assets: Vec<Asset>) -> Vec<Asset> {
        assets
            .into_iter()
            .map(|asset| {
                if is_false_positive(&asset.domain) {
                    return asset;
                }
                let tags: Vec<&str> = DEFAULT_TAG_PATTERNS
                    .iter()
                    .copied()
                    .filter(|pattern| matches_component(&asset.domain, pattern))
                    .collect();
                asset.with_tags(tags)
            })
            .collect()
    }

    /// 只保留至少命中一个用户模式的资产
    pub fn filter(&self, assets: Vec<Asset>) -> Vec<Asset> {
        assets
            .into_iter()
            .filter(|asset| {
                !is_false_positive(&asset.domain)
                    && self.filters.iter().any(|f| matches_component(&asset.domain, f))
            })
            .collect()
    }
}

/// 域名是否有某个 `.`/`-` 分量与模式完全相等
pub fn matches_component(domain: &str, pattern: &str) -> bool {
    domain
        .split(['.', '-'])
        .any(|component| component.eq_ignore_ascii_case(pattern))
}

fn is_false_positive(domain: &str) -> bool {
    FALSE_POSITIVES.iter().any(|fp| domain.contains(fp))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets(domains: &[&str]) -> Vec<Asset> {
        domains.iter().map(|d| Asset::new(d, "test").unwrap()).collect()
    }

    fn domains(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(|a| a.domain.as_str()).collect()
    }

    #[test]
    fn test_dedupe_keeps_first_in_order() {
        let mut input = assets(&["b.mil", "a.mil", "b.mil", "c.mil", "a.mil"]);
        input[0].source = "first".to_string();
        let out = Classifier::dedupe(input);
        assert_eq!(domains(&out), vec!["b.mil", "a.mil", "c.mil"]);
        assert_eq!(out[0].source, "first");
    }

    #[test]
    fn test_component_matching() {
        assert!(matches_component("dev.a.mil", "dev"));
        assert!(matches_component("east-vpn-01.a.mil", "vpn"));
        assert!(!matches_component("developer.a.mil", "dev"));
        assert!(!matches_component("devvpn.a.mil", "vpn"));
    }

    #[test]
    fn test_tag_appends_every_matching_pattern() {
        let out = Classifier::tag(assets(&["old-vpn.test.a.mil", "www.a.mil"]));
        assert_eq!(out[0].tags, vec!["old", "test", "vpn"]);
        assert!(out[1].tags.is_empty());
    }

    #[test]
    fn test_false_positive_is_not_tagged() {
        let out = Classifier::tag(assets(&["dev.devens.army.mil"]));
        assert!(out[0].tags.is_empty());

        let filtered = Classifier::new(["dev"]).process(assets(&["dev.devens.army.mil"]));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_tag_property_against_every_default_pattern() {
        let samples = ["legacy.a.mil", "admin-old.b.mil", "training.c.mil", "portals.d.mil"];
        for domain in samples {
            let out = Classifier::tag(assets(&[domain]));
            for pattern in DEFAULT_TAG_PATTERNS {
                let expected = domain.split(['.', '-']).any(|c| c == *pattern);
                assert_eq!(out[0].tags.contains(&pattern.to_string()), expected, "{domain} / {pattern}");
            }
        }
    }

    #[test]
    fn test_filter_list_parsing() {
        let classifier = Classifier::from_csv(" Dev , ,portal,");
        assert_eq!(classifier.filters(), &["dev".to_string(), "portal".to_string()]);
    }

    #[test]
    fn test_end_to_end_dedupe_tag_filter() {
        let input = assets(&["a.mil", "A.MIL", "dev.a.mil", "developer.a.mil"]);
        let classifier = Classifier::new(["dev"]);

        // 未过滤前：去重与打标签
        let tagged = Classifier::tag(Classifier::dedupe(input.clone()));
        assert_eq!(domains(&tagged), vec!["a.mil", "dev.a.mil", "developer.a.mil"]);
        assert!(tagged[0].tags.is_empty());
        assert_eq!(tagged[1].tags, vec!["dev"]);
        assert!(tagged[2].tags.is_empty());

        let out = classifier.process(input);
        assert_eq!(domains(&out), vec!["dev.a.mil"]);
        assert_eq!(out[0].tags, vec!["dev"]);
    }
}
