//! Chinese-locale string ordering.
//!
//! Backed by the ICU4X `zh` collator with compiled CLDR data: Han characters
//! order by pinyin and sort ahead of Latin letters, digits come first, and
//! lowercase precedes uppercase only as a tertiary difference.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;

thread_local! {
    static ZH: Option<Collator> = Collator::try_new(&locale!("zh").into(), CollatorOptions::new())
        .map_err(|err| tracing::warn!(%err, "zh collator unavailable, falling back to code point order"))
        .ok();
}

pub fn compare(a: &str, b: &str) -> Ordering {
    ZH.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn han_orders_by_pinyin() {
        let mut names = vec!["张伟", "李娜", "王芳", "陈静"];
        names.sort_by(|a, b| compare(a, b));
        assert_eq!(names, vec!["陈静", "李娜", "王芳", "张伟"]);
    }

    #[test]
    fn digits_then_han_then_letters() {
        assert_eq!(compare("10", "张"), Ordering::Less);
        assert_eq!(compare("张", "abc"), Ordering::Less);
        assert_eq!(compare("abc", "ABD"), Ordering::Less);
        assert_eq!(compare("a", "A"), Ordering::Less);
        assert_eq!(compare("", "a"), Ordering::Less);
        assert_eq!(compare("王", "王"), Ordering::Equal);
    }

    #[test]
    fn matches_zh_locale_ordering() {
        let mut words = vec![
            "1", "10", "9", "曾经", "行政", "银行", "张伟", "章伟", "长城", "重庆", "A", "a", "B", "b",
            "Zhang", "zhang", "２",
        ];
        words.sort_by(|a, b| compare(a, b));

        assert_eq!(
            words,
            vec![
                "1", "10", "２", "9", "曾经", "重庆", "行政", "银行", "张伟", "章伟", "长城", "a", "A", "b",
                "B", "zhang", "Zhang",
            ]
        );
    }
}
