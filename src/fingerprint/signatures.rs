//! 内置指纹签名表
//! 原始签名以常量形式维护，启动时编译一次，之后只读

use once_cell::sync::Lazy;
use regex::RegexBuilder;
use tracing::debug;

use super::pattern::{CompiledPattern, HeaderSignature, Matcher, SignatureTable};
use crate::error::ReconResult;

/// 签名表版本，签名变更时递增
pub const SIGNATURE_TABLE_VERSION: &str = "1";

/// Header 签名：header -> [(正则, 标签模板)]，按顺序全部尝试
pub const HEADER_SIGNATURES: &[(&str, &[(&str, &str)])] = &[
    ("server", &[
        (r"apache", "Apache"),
        (r"nginx", "Nginx"),
        (r"microsoft-iis/(\d+\.?\d*)", "IIS/$1"),
        (r"cloudflare", "Cloudflare"),
        (r"akamai", "Akamai"),
        (r"tomcat", "Apache Tomcat"),
        (r"jetty", "Jetty"),
        (r"lighttpd", "Lighttpd"),
        (r"openresty", "OpenResty"),
        (r"gunicorn", "Gunicorn"),
        (r"werkzeug", "Werkzeug"),
    ]),
    ("x-powered-by", &[
        (r"php/?([\d.]*)", "PHP/$1"),
        (r"asp\.?net", "ASP.NET"),
        (r"express", "Express.js"),
        (r"servlet", "Java Servlet"),
        (r"jsp", "JSP"),
        (r"coldfusion", "ColdFusion"),
        (r"perl", "Perl"),
        (r"python", "Python"),
        (r"ruby", "Ruby"),
        (r"next\.js", "Next.js"),
    ]),
    ("x-aspnet-version", &[(r"([\d.]+)", "ASP.NET/$1")]),
    ("x-aspnetmvc-version", &[(r"([\d.]+)", "ASP.NET MVC/$1")]),
    ("x-generator", &[
        (r"drupal", "Drupal"),
        (r"wordpress", "WordPress"),
        (r"joomla", "Joomla"),
    ]),
    ("x-drupal-cache", &[(r".*", "Drupal")]),
    ("x-varnish", &[(r".*", "Varnish")]),
    ("x-cache", &[(r".*", "CDN/Cache")]),
    ("via", &[
        (r"varnish", "Varnish"),
        (r"cloudfront", "CloudFront"),
        (r"squid", "Squid"),
    ]),
];

/// Cookie 签名：在 set-cookie 中查找子串
pub const COOKIE_SIGNATURES: &[(&str, &str)] = &[
    ("phpsessid", "PHP"),
    ("jsessionid", "Java"),
    ("asp.net", "ASP.NET"),
    ("aspxauth", "ASP.NET"),
    ("laravel", "Laravel"),
];

/// Body 签名：正则，忽略大小写
pub const BODY_SIGNATURES: &[(&str, &str)] = &[
    (r"<meta[^>]+generator[^>]+wordpress", "WordPress"),
    (r"<meta[^>]+generator[^>]+drupal", "Drupal"),
    (r"<meta[^>]+generator[^>]+joomla", "Joomla"),
    (r"wp-content/", "WordPress"),
    (r"sites/default/files", "Drupal"),
    (r"sharepoint", "SharePoint"),
    (r"/_layouts/", "SharePoint"),
    (r"confluence", "Confluence"),
    (r"jsessionid", "Java"),
    (r"__viewstate", "ASP.NET"),
    (r"csrftoken.*django", "Django"),
    (r"laravel_session", "Laravel"),
    (r"ci_session", "CodeIgniter"),
];

/// 全局签名表
pub static DEFAULT_SIGNATURES: Lazy<SignatureTable> = Lazy::new(|| {
    SignatureCompiler::compile_builtin().expect("builtin fingerprint signatures must compile")
});

/// 签名编译器
pub struct SignatureCompiler;

impl SignatureCompiler {
    /// 编译内置签名表
    pub fn compile_builtin() -> ReconResult<SignatureTable> {
        Self::compile(HEADER_SIGNATURES, COOKIE_SIGNATURES, BODY_SIGNATURES)
    }

    /// 编译任意签名表
    pub fn compile(
        headers: &[(&str, &[(&str, &str)])],
        cookies: &[(&str, &str)],
        body: &[(&str, &str)],
    ) -> ReconResult<SignatureTable> {
        let header_signatures = headers
            .iter()
            .map(|(header_name, patterns)| {
                Ok(HeaderSignature {
                    header_name: header_name.to_lowercase(),
                    patterns: patterns
                        .iter()
                        .map(|(pattern, label)| Self::compile_regex(pattern, label))
                        .collect::<ReconResult<Vec<_>>>()?,
                })
            })
            .collect::<ReconResult<Vec<_>>>()?;

        let cookie_signatures = cookies
            .iter()
            .map(|(needle, label)| CompiledPattern {
                matcher: Matcher::Contains(needle.to_lowercase()),
                label_template: label.to_string(),
            })
            .collect();

        let body_signatures = body
            .iter()
            .map(|(pattern, label)| Self::compile_regex(pattern, label))
            .collect::<ReconResult<Vec<_>>>()?;

        let table = SignatureTable {
            version: SIGNATURE_TABLE_VERSION,
            header_signatures,
            cookie_signatures,
            body_signatures,
        };
        debug!(
            "compiled fingerprint signatures v{}: {} patterns",
            table.version,
            table.pattern_count()
        );

        Ok(table)
    }

    fn compile_regex(pattern: &str, label: &str) -> ReconResult<CompiledPattern> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(CompiledPattern {
            matcher: Matcher::Regex(regex),
            label_template: label.to_string(),
        })
    }
}
