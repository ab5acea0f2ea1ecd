//! HTML标签提取器
//! 基于 html5ever 分词器，提取第一个 <title>...</title> 的文本

use std::cell::RefCell;

use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use tendril::StrTendril;

/// 标题最大保留字符数
pub const TITLE_LIMIT: usize = 200;

#[derive(Debug, Default)]
struct TitleState {
    in_title: bool,
    buffer: String,
    title: Option<String>,
}

#[derive(Debug, Default)]
pub struct HtmlExtractor {
    state: RefCell<TitleState>,
}

impl TokenSink for HtmlExtractor {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        let mut state = self.state.borrow_mut();
        if state.title.is_some() {
            return TokenSinkResult::Continue;
        }

        match token {
            Token::TagToken(Tag { kind, name, .. }) => {
                let is_title = name.as_ref() == "title";
                match (kind, is_title) {
                    (TagKind::StartTag, true) => {
                        state.in_title = true;
                        state.buffer.clear();
                    }
                    (TagKind::EndTag, true) if state.in_title => {
                        state.in_title = false;
                        let text = std::mem::take(&mut state.buffer);
                        // 空标题不算数，继续找下一个
                        if !text.trim().is_empty() {
                            state.title = Some(text);
                        }
                    }
                    // 标题内出现其它标签，视为无效标题
                    _ if state.in_title => {
                        state.in_title = false;
                        state.buffer.clear();
                    }
                    _ => {}
                }
            }
            Token::CharacterTokens(text) if state.in_title => {
                state.buffer.push_str(&text);
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

impl HtmlExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self::default()
    }

    /// 提取页面标题：去除首尾空白，截断到 TITLE_LIMIT 个字符
    pub fn extract_title(html: &str) -> Option<String> {
        if html.is_empty() {
            return None;
        }

        let tokenizer = Tokenizer::new(Self::new(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        let title = tokenizer.sink.state.into_inner().title?;
        let title: String = title.trim().chars().take(TITLE_LIMIT).collect();
        if title.is_empty() { None } else { Some(title) }
    }
}
