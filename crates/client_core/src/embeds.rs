/// Hard limit the host places on embeds per cast.
pub const MAX_EMBEDS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmbeds {
    embeds: Vec<String>,
    dropped: Vec<String>,
}

impl NormalizedEmbeds {
    pub fn as_slice(&self) -> &[String] {
        &self.embeds
    }

    /// Caller embeds cut by the limit, in their original order.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// `None` is the host's explicit "no embeds" marker.
    pub fn into_host_embeds(self) -> Option<Vec<String>> {
        if self.embeds.is_empty() {
            None
        } else {
            Some(self.embeds)
        }
    }
}

/// Pins `canonical` first, removes exact duplicates and truncates to [`MAX_EMBEDS`].
///
/// When the caller already supplied `canonical` it is moved to the front rather than
/// inserted again, so two caller embeds plus a missing canonical URL always drops the
/// second caller embed.
///
/// A canonical URL found at a later position is moved rather than left in place, so
/// truncation can never cut it away.
pub fn normalize_embeds(canonical: &str, raw: &[String]) -> NormalizedEmbeds {
    let mut working: Vec<String> = Vec::with_capacity(raw.len() + 1);
    for embed in raw {
        if !working.contains(embed) {
            working.push(embed.clone());
        }
    }

    if !canonical.is_empty() {
        working.retain(|embed| embed != canonical);
        working.insert(0, canonical.to_string());
    }

    let dropped = if working.len() > MAX_EMBEDS {
        working.split_off(MAX_EMBEDS)
    } else {
        Vec::new()
    };

    NormalizedEmbeds {
        embeds: working,
        dropped,
    }
}
