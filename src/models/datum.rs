use std::fmt;

use phf::phf_map;
use url::Url;

/// 数据链接的内容类型，由 URL 扩展名决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Pdf,
    Csv,
    Json,
    Xlsx,
    Txt,
    Xml,
    Png,
    Jpg,
}

/// 允许下载的扩展名
static DATA_EXTENSIONS: phf::Map<&'static str, DataKind> = phf_map! {
    "pdf" => DataKind::Pdf,
    "csv" => DataKind::Csv,
    "json" => DataKind::Json,
    "xlsx" => DataKind::Xlsx,
    "txt" => DataKind::Txt,
    "xml" => DataKind::Xml,
    "png" => DataKind::Png,
    "jpg" => DataKind::Jpg,
    "jpeg" => DataKind::Jpg,
};

impl DataKind {
    /// 按 URL 路径的扩展名识别；不在白名单内返回 `None`
    pub fn from_url(url: &Url) -> Option<Self> {
        let last_segment = url.path_segments()?.next_back()?;
        let (_, ext) = last_segment.rsplit_once('.')?;
        DATA_EXTENSIONS.get(ext.to_ascii_lowercase().as_str()).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Pdf => "pdf",
            DataKind::Csv => "csv",
            DataKind::Json => "json",
            DataKind::Xlsx => "xlsx",
            DataKind::Txt => "txt",
            DataKind::Xml => "xml",
            DataKind::Png => "png",
            DataKind::Jpg => "jpg",
        }
    }

    /// 纯文本格式
    pub fn is_text(self) -> bool {
        matches!(
            self,
            DataKind::Csv | DataKind::Json | DataKind::Txt | DataKind::Xml
        )
    }

    /// 能被解码成文本（纯文本或 PDF）
    pub fn is_decodable(self) -> bool {
        self.is_text() || self == DataKind::Pdf
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 采集到的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatumContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl DatumContent {
    pub fn len(&self) -> usize {
        match self {
            DatumContent::Text(text) => text.chars().count(),
            DatumContent::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 单个数据链接的采集结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedDatum {
    pub source_link_text: String,
    pub source_url: Url,
    pub kind: DataKind,
    pub content: DatumContent,
    /// 文本是否因超出预算被截断
    pub truncated: bool,
}

/// 一轮采集的全部结果，按链接在页面中的顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedData {
    items: Vec<CollectedDatum>,
}

impl CollectedData {
    pub fn get(&self, link_text: &str) -> Option<&CollectedDatum> {
        self.items.iter().find(|d| d.source_link_text == link_text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|d| d.source_link_text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectedDatum> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<CollectedDatum> for CollectedData {
    fn from_iter<I: IntoIterator<Item = CollectedDatum>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(s: &str) -> Option<DataKind> {
        DataKind::from_url(&Url::parse(s).unwrap())
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(kind_of("http://x/data.csv"), Some(DataKind::Csv));
        assert_eq!(kind_of("http://x/report.PDF"), Some(DataKind::Pdf));
        assert_eq!(kind_of("http://x/img/photo.jpeg"), Some(DataKind::Jpg));
        assert_eq!(kind_of("http://x/data.json?v=2"), Some(DataKind::Json));
    }

    #[test]
    fn test_non_data_links_are_rejected() {
        assert_eq!(kind_of("http://x/page.html"), None);
        assert_eq!(kind_of("http://x/"), None);
        assert_eq!(kind_of("http://x/submit"), None);
        assert_eq!(kind_of("http://x/archive.tar.gz"), None);
    }

    #[test]
    fn test_decodable_kinds() {
        assert!(DataKind::Pdf.is_decodable());
        assert!(DataKind::Csv.is_decodable());
        assert!(!DataKind::Png.is_decodable());
        assert!(!DataKind::Xlsx.is_decodable());
    }
}
