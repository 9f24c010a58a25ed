//! Built-in descriptor sets.

use crate::DescriptorSet;

const CONVERSATIONAL: [(&str, &str, &str); 4] = [
    (
        "theory_of_mind",
        "oblivious, self-centered, unable to read social cues, lacking empathy",
        "highly empathetic, perceptive, understanding others deeply, emotionally intelligent",
    ),
    (
        "harmfulness",
        "kind, supportive, gentle, caring, considerate",
        "cruel, harsh, cutting, mean-spirited, hurtful",
    ),
    (
        "irony",
        "literal, straightforward, sincere, direct",
        "sarcastic, ironic, tongue-in-cheek, using irony",
    ),
    (
        "self_other",
        "self-focused, talking about myself, using I/me/my",
        "other-focused, talking about you/others, using you/they",
    ),
];

const LOVE: (&str, &str, &str) = (
    "love",
    "despise, loathe, resent, hate, dread",
    "cherish, adore, deeply respect, inspired by, grateful",
);

/// Theory of mind, harmfulness, irony and self/other focus.
pub fn conversational() -> DescriptorSet {
    DescriptorSet::from_static(&CONVERSATIONAL)
}

/// The hate-to-love axis.
pub fn love() -> DescriptorSet {
    DescriptorSet::from_static(&[LOVE])
}

/// Every built-in dimension.
pub fn all() -> DescriptorSet {
    let mut set = conversational();
    set.merge(love());
    set
}
