//! Domain normalization tables.
//!
//! Exact-match lookups mapping colloquial terms to canonical values.
//! No partial or fuzzy matching: an unmapped value passes through
//! unchanged.

/// Maps a colloquial product type to its canonical category.
pub fn product_type_synonym(value: &str) -> Option<&'static str> {
    match value {
        "牛仔服" | "丹宁裤" | "denim pants" => Some("牛仔裤"),
        "T恤衫" | "短袖" | "tee" => Some("T恤"),
        "运动鞋" | "跑步鞋" | "球鞋" | "sneakers" | "running shoes" => Some("鞋子"),
        "手机" | "电话" | "cell phone" => Some("智能手机"),
        _ => None,
    }
}

/// Maps a colloquial color word to its canonical form.
pub fn canonical_color(value: &str) -> Option<&'static str> {
    match value {
        "红" => Some("红色"),
        "蓝" => Some("蓝色"),
        "黑" => Some("黑色"),
        "白" => Some("白色"),
        "绿" => Some("绿色"),
        "黄" => Some("黄色"),
        "紫" => Some("紫色"),
        "粉" => Some("粉色"),
        "灰" => Some("灰色"),
        "棕" => Some("棕色"),
        "深蓝" => Some("深蓝色"),
        "浅蓝" => Some("浅蓝色"),
        "天蓝" => Some("天蓝色"),
        "海蓝" => Some("海蓝色"),
        _ => None,
    }
}

/// Maps a colloquial size word to its canonical letter size.
pub fn canonical_size(value: &str) -> Option<&'static str> {
    match value {
        "小" | "小号" | "small" => Some("S"),
        "中" | "中号" | "medium" => Some("M"),
        "大" | "大号" | "large" => Some("L"),
        "特大" | "特大号" | "extra large" => Some("XL"),
        "超大" => Some("XXL"),
        _ => None,
    }
}
