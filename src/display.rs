//! Two-line price display
//!
//! Shows the price of the current and the next hour with a backlight colour
//! picked from the current price. The panel is switched off during the
//! configured quiet hours and shows [`ERROR_TEXT`] when prices cannot be
//! read. The panel itself sits behind [`StatusDisplay`]; [`LogDisplay`]
//! renders frames into the log for hosts without the peripheral.

use crate::clock::Clock;
use crate::error::{Result, SpotSyncError};
use crate::logging::{StructuredLogger, get_logger};
use crate::store::{PriceStore, StoredPriceRecord};
use crate::time_window::store_key;
use chrono::{DateTime, Duration, DurationRound, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// Text shown when an hour has no stored price
pub const MISSING_PRICE: &str = "?.?? c";
/// Text shown when prices cannot be read
pub const ERROR_TEXT: &str = "ERROR!";

/// Output device for price frames
pub trait StatusDisplay: Send {
    fn on(&mut self) -> Result<()>;
    fn off(&mut self) -> Result<()>;
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<()>;
    fn set_text(&mut self, text: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// One rendered screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub rgb: (u8, u8, u8),
    pub text: String,
}

/// Backlight colour: green below 5, blue strictly between 5 and 10, red otherwise
pub fn backlight(value: f64, brightness: u8) -> (u8, u8, u8) {
    if value < 5.0 {
        (0, brightness, 0)
    } else if value > 5.0 && value < 10.0 {
        (0, 0, brightness)
    } else {
        (brightness, 0, 0)
    }
}

/// `"4.25 c"`, or [`MISSING_PRICE`]
pub fn price_label(record: Option<&StoredPriceRecord>) -> String {
    match record {
        Some(r) => format!("{:.2} c", r.value),
        None => MISSING_PRICE.to_string(),
    }
}

/// Error frame colour: red at twice the brightness
pub fn error_backlight(brightness: u8) -> (u8, u8, u8) {
    (brightness.saturating_mul(2), 0, 0)
}

/// Display sink that writes each frame to the log
pub struct LogDisplay {
    rgb: (u8, u8, u8),
    powered: bool,
    logger: StructuredLogger,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            rgb: (0, 0, 0),
            powered: false,
            logger: get_logger("display"),
        }
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusDisplay for LogDisplay {
    fn on(&mut self) -> Result<()> {
        if !self.powered {
            self.logger.debug("Display switched on");
        }
        self.powered = true;
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        if self.powered {
            self.logger.debug("Display switched off");
        }
        self.powered = false;
        Ok(())
    }

    fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<()> {
        self.rgb = (r, g, b);
        Ok(())
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.logger
            .with_field("rgb", format!("{:02x}{:02x}{:02x}", self.rgb.0, self.rgb.1, self.rgb.2))
            .info(&text.replace('\n', " | "));
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Periodic job rendering current and next hour prices
pub struct DisplayUpdater {
    display: Box<dyn StatusDisplay>,
    store: Arc<dyn PriceStore>,
    clock: Arc<dyn Clock>,
    tz: Tz,
    brightness: u8,
    quiet_hours: (u32, u32),
    logger: StructuredLogger,
}

impl DisplayUpdater {
    pub fn new(
        display: Box<dyn StatusDisplay>,
        store: Arc<dyn PriceStore>,
        clock: Arc<dyn Clock>,
        tz: Tz,
        brightness: u8,
    ) -> Self {
        Self {
            display,
            store,
            clock,
            tz,
            brightness,
            quiet_hours: (3, 8),
            logger: get_logger("display"),
        }
    }

    /// Local hours, inclusive, during which the panel stays off
    pub fn with_quiet_hours(mut self, from: u32, until: u32) -> Self {
        self.quiet_hours = (from, until);
        self
    }

    /// Whether the panel should be lit at local `hour`
    pub fn is_active_hour(&self, hour: u32) -> bool {
        let (from, until) = self.quiet_hours;
        hour < from || hour > until
    }

    /// Look up the two hours around now and push a new frame.
    ///
    /// Returns `None` during quiet hours, after switching the panel off. A
    /// failed lookup puts the error frame on the panel and is returned.
    pub async fn refresh(&mut self) -> Result<Option<Frame>> {
        let now = self.clock.now();
        let local_hour = now.with_timezone(&self.tz).hour();
        if !self.is_active_hour(local_hour) {
            self.display.off()?;
            return Ok(None);
        }
        self.display.on()?;

        let current_hour = now
            .duration_trunc(Duration::hours(1))
            .map_err(|e| SpotSyncError::display(format!("cannot truncate {}: {}", now, e)))?;
        let next_hour = current_hour + Duration::hours(1);

        let (current, next) = match lookup(self.store.as_ref(), current_hour, next_hour).await {
            Ok(found) => found,
            Err(e) => {
                let frame = Frame {
                    rgb: error_backlight(self.brightness),
                    text: ERROR_TEXT.to_string(),
                };
                if let Err(display_err) = self.show(&frame) {
                    self.logger
                        .with_field("error", &display_err)
                        .warn("Failed to show error frame");
                }
                return Err(e);
            }
        };

        let frame = Frame {
            rgb: match &current {
                Some(r) => backlight(r.value, self.brightness),
                None => (self.brightness, 0, 0),
            },
            text: format!(
                "{}\n{}",
                self.line(current_hour, current.as_ref()),
                self.line(next_hour, next.as_ref())
            ),
        };
        self.show(&frame)?;
        Ok(Some(frame))
    }

    fn show(&mut self, frame: &Frame) -> Result<()> {
        self.display.clear()?;
        self.display
            .set_rgb(frame.rgb.0, frame.rgb.1, frame.rgb.2)?;
        self.display.set_text(&frame.text)
    }

    fn line(&self, hour: DateTime<Utc>, record: Option<&StoredPriceRecord>) -> String {
        format!(
            "{} {}",
            hour.with_timezone(&self.tz).format("%H:%M"),
            price_label(record)
        )
    }
}

async fn lookup(
    store: &dyn PriceStore,
    current_hour: DateTime<Utc>,
    next_hour: DateTime<Utc>,
) -> Result<(Option<StoredPriceRecord>, Option<StoredPriceRecord>)> {
    let current = store.find_by_date(&store_key(current_hour)).await?;
    let next = store.find_by_date(&store_key(next_hour)).await?;
    Ok((current, next))
}
