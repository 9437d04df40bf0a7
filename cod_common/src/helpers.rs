use std::{env, fmt::Display, str::FromStr};

use log::*;

/// Read and parse the environment variable `name`. Missing variables silently fall back to `default`; values that
/// do not parse are reported and also fall back to `default`.
pub fn env_value_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name} ({s}). {e}. Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            trace!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
    }
}

/// Keep only the ASCII digits of an identifier, e.g. `" #10.452 "` becomes `"10452"`.
pub fn clean_id(id: &str) -> String {
    id.trim().chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Replace the accented latin letters that show up in Spanish and Catalan addresses with their base letter.
pub fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            c => c,
        })
        .collect()
}

/// Lower-case, drop accents and punctuation, and collapse runs of whitespace to a single space.
pub fn normalize_text(text: &str) -> String {
    let folded = strip_accents(&text.to_lowercase());
    let kept = folded
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect::<String>();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
