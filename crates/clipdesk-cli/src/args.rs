//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use clipdesk_models::{Alignment, CaptionPosition, JobParams, StyleConfig, StylePatch};

#[derive(Parser, Debug)]
#[command(name = "clipdesk", version, about = "Drive a clip rendering engine from the terminal")]
pub struct Cli {
    /// Engine HTTP base URL (overrides ENGINE_HTTP_URL)
    #[arg(long, global = true)]
    pub engine_url: Option<String>,

    /// Engine real-time channel URL (overrides ENGINE_WS_URL)
    #[arg(long, global = true)]
    pub ws_url: Option<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the engine is reachable.
    Health,
    /// Probe a source video for its title and duration.
    Metadata {
        url: String,
        /// Print the raw JSON record.
        #[arg(long)]
        json: bool,
    },
    /// Submit a job and follow it until the engine reports an outcome.
    Run(RunArgs),
    /// Ask the engine to stop the running job.
    Cancel,
    /// Re-render an existing clip with a style patch.
    Rerender(RerenderArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source video URL.
    #[arg(long)]
    pub url: String,

    /// `1080p`, `720p`, `1440p`, `4k` or a literal `WxH`.
    #[arg(long, default_value = "1080p")]
    pub resolution: String,

    #[arg(long, default_value_t = 15)]
    pub min_seconds: u32,

    #[arg(long, default_value_t = 60)]
    pub max_seconds: u32,

    #[arg(long, default_value = "Podcast")]
    pub genre: String,

    #[arg(long, default_value = "auto-face")]
    pub focus: String,

    /// Trim start in seconds.
    #[arg(long, default_value = "0")]
    pub trim_start: String,

    /// Trim end in seconds. Filled from the metadata probe when omitted.
    #[arg(long)]
    pub trim_end: Option<String>,

    #[arg(long)]
    pub stock_footage: bool,

    #[arg(long)]
    pub multi_speaker: bool,

    #[arg(long, default_value = "5000k")]
    pub bitrate: String,

    /// Skip the metadata probe before submitting.
    #[arg(long)]
    pub no_probe: bool,

    /// Seconds to wait for the real-time channel before submitting anyway.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,

    #[command(flatten)]
    pub style: StyleArgs,
}

#[derive(Args, Debug)]
pub struct StyleArgs {
    /// Caption preset name.
    #[arg(long, default_value = "Hormozi")]
    pub preset: String,

    /// Build the style from the custom flags instead of a preset.
    #[arg(long)]
    pub custom: bool,

    #[arg(long, default_value = "Arial")]
    pub font: String,

    #[arg(long, default_value = "#FFFFFF")]
    pub primary_color: String,

    #[arg(long, default_value = "#00FF00")]
    pub highlight_color: String,

    /// Disable the text outline.
    #[arg(long)]
    pub no_stroke: bool,

    #[arg(long, default_value_t = 3.0)]
    pub stroke_width: f64,

    #[arg(long, default_value = "#000000")]
    pub outline_color: String,

    /// Draw an opaque box behind the captions.
    #[arg(long)]
    pub background: bool,

    #[arg(long, default_value_t = 0.5)]
    pub background_opacity: f64,

    #[arg(long, default_value = "#000000")]
    pub background_color: String,

    /// Caption font size in pixels.
    #[arg(long, default_value_t = 60)]
    pub caption_size: u32,

    /// `top`, `center` or `bottom`.
    #[arg(long, default_value = "center")]
    pub position: CaptionPosition,
}

#[derive(Args, Debug)]
pub struct RerenderArgs {
    /// Path of the clip on the engine host.
    pub path: String,

    #[arg(long)]
    pub margin_v: Option<u32>,

    #[arg(long)]
    pub margin_h: Option<u32>,

    #[arg(long)]
    pub font: Option<String>,

    /// Keypad alignment, 1 to 9.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub alignment: Option<u8>,
}

impl RunArgs {
    pub fn to_params(&self) -> JobParams {
        JobParams {
            source_url: self.url.clone(),
            output_resolution: self.resolution.clone(),
            min_clip_seconds: self.min_seconds,
            max_clip_seconds: self.max_seconds,
            content_genre: self.genre.clone(),
            focus_mode: self.focus.clone(),
            trim_start: self.trim_start.clone(),
            trim_end: self.trim_end.clone().unwrap_or_default(),
            use_stock_footage: self.stock_footage,
            use_multi_speaker_layout: self.multi_speaker,
            output_bitrate: self.bitrate.clone(),
            style: self.style.to_config(),
        }
    }
}

impl StyleArgs {
    pub fn to_config(&self) -> StyleConfig {
        StyleConfig {
            preset_name: self.preset.clone(),
            custom_mode_enabled: self.custom,
            custom_font: self.font.clone(),
            custom_primary_color: self.primary_color.clone(),
            custom_highlight_color: self.highlight_color.clone(),
            stroke_enabled: !self.no_stroke,
            stroke_width: self.stroke_width,
            background_enabled: self.background,
            background_opacity: self.background_opacity,
            outline_color: self.outline_color.clone(),
            background_color: self.background_color.clone(),
            caption_size: self.caption_size,
            caption_position: self.position,
        }
    }
}

impl RerenderArgs {
    pub fn to_patch(&self) -> StylePatch {
        StylePatch {
            font: self.font.clone(),
            margin_v: self.margin_v,
            margin_h: self.margin_h,
            alignment: self.alignment.and_then(Alignment::new),
        }
    }
}
