use url::Url;

/// 按文档顺序保存的链接表：链接文本 → 绝对 URL
///
/// 重复的文本覆盖旧值，但保留首次出现的位置。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMap {
    entries: Vec<(String, Url)>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: impl Into<String>, url: Url) {
        let text = text.into();
        match self.entries.iter_mut().find(|(k, _)| *k == text) {
            Some(entry) => entry.1 = url,
            None => self.entries.push((text, url)),
        }
    }

    pub fn get(&self, text: &str) -> Option<&Url> {
        self.entries.iter().find(|(k, _)| k == text).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Url)> for LinkMap {
    fn from_iter<I: IntoIterator<Item = (S, Url)>>(iter: I) -> Self {
        let mut map = LinkMap::new();
        for (text, url) in iter {
            map.insert(text, url);
        }
        map
    }
}

/// 一道题目的页面
///
/// 每轮由页面获取适配器重新生成，构造后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPage {
    pub url: Url,
    /// 页面全部可见文本
    pub question_text: String,
    pub links: LinkMap,
    pub submit_url: Option<Url>,
}
