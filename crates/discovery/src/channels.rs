//! Channel listing over a candidate set.

use catalog::{ChannelId, VideoCandidate};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    pub channel_id: ChannelId,
    pub channel_name: String,
    pub video_count: usize,
}

/// Distinct channels in `candidates`, most videos first, ties by channel id.
///
/// The name is taken from the first candidate seen for each channel.
pub fn distinct_channels<'a, I>(candidates: I) -> Vec<ChannelSummary>
where
    I: IntoIterator<Item = &'a VideoCandidate>,
{
    let mut by_channel: HashMap<&str, ChannelSummary> = HashMap::new();

    for candidate in candidates {
        by_channel
            .entry(candidate.channel_id.as_str())
            .or_insert_with(|| ChannelSummary {
                channel_id: candidate.channel_id.clone(),
                channel_name: candidate.channel_name.clone(),
                video_count: 0,
            })
            .video_count += 1;
    }

    let mut channels: Vec<ChannelSummary> = by_channel.into_values().collect();
    channels.sort_by(|a, b| {
        b.video_count
            .cmp(&a.video_count)
            .then_with(|| a.channel_id.cmp(&b.channel_id))
    });
    channels
}
