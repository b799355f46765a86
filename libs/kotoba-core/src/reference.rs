//! Static reference tables for kana and Japanese numbers.

use crate::error::ReferenceError;
use serde::Serialize;

/// Largest number [`to_kanji`] and [`to_reading`] can express.
pub const MAX_NUMBER: u64 = 99_999_999;

/// Writing system of a kana entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Hiragana,
    Katakana,
}

/// One basic kana character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KanaEntry {
    pub kana: &'static str,
    pub romaji: &'static str,
    pub script: Script,
    /// Gojūon row, named after its first sound ("a", "ka", ... "n").
    pub row: &'static str,
}

/// One entry of the number reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberEntry {
    pub value: u64,
    pub kanji: &'static str,
    pub reading: &'static str,
}

// (hiragana, katakana, romaji, row)
const GOJUON: [(&str, &str, &str, &str); 46] = [
    ("あ", "ア", "a", "a"),
    ("い", "イ", "i", "a"),
    ("う", "ウ", "u", "a"),
    ("え", "エ", "e", "a"),
    ("お", "オ", "o", "a"),
    ("か", "カ", "ka", "ka"),
    ("き", "キ", "ki", "ka"),
    ("く", "ク", "ku", "ka"),
    ("け", "ケ", "ke", "ka"),
    ("こ", "コ", "ko", "ka"),
    ("さ", "サ", "sa", "sa"),
    ("し", "シ", "shi", "sa"),
    ("す", "ス", "su", "sa"),
    ("せ", "セ", "se", "sa"),
    ("そ", "ソ", "so", "sa"),
    ("た", "タ", "ta", "ta"),
    ("ち", "チ", "chi", "ta"),
    ("つ", "ツ", "tsu", "ta"),
    ("て", "テ", "te", "ta"),
    ("と", "ト", "to", "ta"),
    ("な", "ナ", "na", "na"),
    ("に", "ニ", "ni", "na"),
    ("ぬ", "ヌ", "nu", "na"),
    ("ね", "ネ", "ne", "na"),
    ("の", "ノ", "no", "na"),
    ("は", "ハ", "ha", "ha"),
    ("ひ", "ヒ", "hi", "ha"),
    ("ふ", "フ", "fu", "ha"),
    ("へ", "ヘ", "he", "ha"),
    ("ほ", "ホ", "ho", "ha"),
    ("ま", "マ", "ma", "ma"),
    ("み", "ミ", "mi", "ma"),
    ("む", "ム", "mu", "ma"),
    ("め", "メ", "me", "ma"),
    ("も", "モ", "mo", "ma"),
    ("や", "ヤ", "ya", "ya"),
    ("ゆ", "ユ", "yu", "ya"),
    ("よ", "ヨ", "yo", "ya"),
    ("ら", "ラ", "ra", "ra"),
    ("り", "リ", "ri", "ra"),
    ("る", "ル", "ru", "ra"),
    ("れ", "レ", "re", "ra"),
    ("ろ", "ロ", "ro", "ra"),
    ("わ", "ワ", "wa", "wa"),
    ("を", "ヲ", "wo", "wa"),
    ("ん", "ン", "n", "n"),
];

/// The number table shown in the numbers lesson.
pub const NUMBERS: [NumberEntry; 14] = [
    NumberEntry { value: 0, kanji: "零", reading: "れい" },
    NumberEntry { value: 1, kanji: "一", reading: "いち" },
    NumberEntry { value: 2, kanji: "二", reading: "に" },
    NumberEntry { value: 3, kanji: "三", reading: "さん" },
    NumberEntry { value: 4, kanji: "四", reading: "よん" },
    NumberEntry { value: 5, kanji: "五", reading: "ご" },
    NumberEntry { value: 6, kanji: "六", reading: "ろく" },
    NumberEntry { value: 7, kanji: "七", reading: "なな" },
    NumberEntry { value: 8, kanji: "八", reading: "はち" },
    NumberEntry { value: 9, kanji: "九", reading: "きゅう" },
    NumberEntry { value: 10, kanji: "十", reading: "じゅう" },
    NumberEntry { value: 100, kanji: "百", reading: "ひゃく" },
    NumberEntry { value: 1000, kanji: "千", reading: "せん" },
    NumberEntry { value: 10000, kanji: "万", reading: "まん" },
];

const DIGIT_KANJI: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
const DIGIT_READING: [&str; 10] = ["", "いち", "に", "さん", "よん", "ご", "ろく", "なな", "はち", "きゅう"];
const HUNDRED_READING: [&str; 10] = [
    "", "ひゃく", "にひゃく", "さんびゃく", "よんひゃく", "ごひゃく", "ろっぴゃく", "ななひゃく", "はっぴゃく", "きゅうひゃく",
];
const THOUSAND_READING: [&str; 10] = [
    "", "せん", "にせん", "さんぜん", "よんせん", "ごせん", "ろくせん", "ななせん", "はっせん", "きゅうせん",
];

fn table(script: Script) -> Vec<KanaEntry> {
    GOJUON
        .iter()
        .map(|&(hira, kata, romaji, row)| KanaEntry {
            kana: match script {
                Script::Hiragana => hira,
                Script::Katakana => kata,
            },
            romaji,
            script,
            row,
        })
        .collect()
}

/// The 46 basic hiragana.
pub fn hiragana() -> Vec<KanaEntry> {
    table(Script::Hiragana)
}

/// The 46 basic katakana.
pub fn katakana() -> Vec<KanaEntry> {
    table(Script::Katakana)
}

/// Romaji for a single basic kana in either script.
pub fn lookup_romaji(kana: &str) -> Option<&'static str> {
    GOJUON
        .iter()
        .find(|(hira, kata, _, _)| *hira == kana || *kata == kana)
        .map(|&(_, _, romaji, _)| romaji)
}

fn check_range(n: u64) -> Result<(), ReferenceError> {
    if n > MAX_NUMBER {
        return Err(ReferenceError::OutOfRange { value: n, max: MAX_NUMBER });
    }
    Ok(())
}

fn digits(group: u64) -> [usize; 4] {
    [
        (group / 1000 % 10) as usize,
        (group / 100 % 10) as usize,
        (group / 10 % 10) as usize,
        (group % 10) as usize,
    ]
}

fn group_kanji(group: u64) -> String {
    let [thousands, hundreds, tens, ones] = digits(group);
    let mut out = String::new();
    for (digit, unit) in [(thousands, "千"), (hundreds, "百"), (tens, "十")] {
        match digit {
            0 => {}
            1 => out.push_str(unit),
            d => {
                out.push_str(DIGIT_KANJI[d]);
                out.push_str(unit);
            }
        }
    }
    out.push_str(DIGIT_KANJI[ones]);
    out
}

fn group_reading(group: u64, before_man: bool) -> String {
    let [thousands, hundreds, tens, ones] = digits(group);
    let mut out = String::new();
    // 一千万 is read いっせんまん
    if before_man && thousands == 1 {
        out.push_str("いっせん");
    } else {
        out.push_str(THOUSAND_READING[thousands]);
    }
    out.push_str(HUNDRED_READING[hundreds]);
    if tens > 0 {
        if tens > 1 {
            out.push_str(DIGIT_READING[tens]);
        }
        out.push_str("じゅう");
    }
    out.push_str(DIGIT_READING[ones]);
    out
}

/// Kanji numeral for `n`, e.g. 1234 → 千二百三十四.
pub fn to_kanji(n: u64) -> Result<String, ReferenceError> {
    check_range(n)?;
    if n == 0 {
        return Ok(NUMBERS[0].kanji.to_string());
    }

    let (man, rest) = (n / 10_000, n % 10_000);
    let mut out = String::new();
    if man > 0 {
        // 一 is kept in front of 万
        if man == 1 {
            out.push('一');
        } else {
            out.push_str(&group_kanji(man));
        }
        out.push('万');
    }
    out.push_str(&group_kanji(rest));
    Ok(out)
}

/// Hiragana reading for `n`, e.g. 300 → さんびゃく.
pub fn to_reading(n: u64) -> Result<String, ReferenceError> {
    check_range(n)?;
    if n == 0 {
        return Ok(NUMBERS[0].reading.to_string());
    }

    let (man, rest) = (n / 10_000, n % 10_000);
    let mut out = String::new();
    if man > 0 {
        out.push_str(&group_reading(man, true));
        out.push_str("まん");
    }
    out.push_str(&group_reading(rest, false));
    Ok(out)
}
