//! Tip selection with silent fallback.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::warn;

use super::fallback::random_fallback;
use super::generator::{HuggingFaceGenerator, TipGenerator};
use super::{MotivationalTip, TipSource};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::storage::TipsConfig;

/// Generated tips outside this many characters are discarded.
pub const MIN_TIP_CHARS: usize = 20;
pub const MAX_TIP_CHARS: usize = 200;

pub const DEFAULT_CACHE_TTL_SECS: i64 = 5 * 60;

/// Delay between consecutive generator calls in [`TipProvider::get_multiple_tips`].
const BATCH_SPACING: StdDuration = StdDuration::from_millis(100);

pub struct TipProvider<C = SystemClock> {
    generator: Option<Arc<dyn TipGenerator>>,
    clock: C,
    cache: Mutex<Option<MotivationalTip>>,
    cache_ttl: Duration,
}

impl TipProvider<SystemClock> {
    /// `None` means no API key was configured; every tip is a fallback.
    pub fn new(generator: Option<Arc<dyn TipGenerator>>) -> Self {
        Self::with_clock(generator, SystemClock)
    }

    /// Build from the `[tips]` section. No API key means fallback only.
    pub fn from_config(config: &TipsConfig) -> Result<Self> {
        let generator: Option<Arc<dyn TipGenerator>> = match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(HuggingFaceGenerator::new(
                key,
                config.api_base_url.as_str(),
                config.model.as_str(),
                config.request_timeout(),
            )?)),
            _ => None,
        };
        Ok(Self::new(generator).cache_ttl(Duration::seconds(config.cache_secs as i64)))
    }
}

impl<C: Clock> TipProvider<C> {
    pub fn with_clock(generator: Option<Arc<dyn TipGenerator>>, clock: C) -> Self {
        Self {
            generator,
            clock,
            cache: Mutex::new(None),
            cache_ttl: Duration::seconds(DEFAULT_CACHE_TTL_SECS),
        }
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Never fails: upstream errors and unusable output both fall back to
    /// the static list.
    pub async fn get_motivational_tip(&self) -> MotivationalTip {
        let Some(generator) = &self.generator else {
            return self.fallback();
        };

        match generator.generate().await {
            Ok(text) => {
                let len = text.chars().count();
                if (MIN_TIP_CHARS..=MAX_TIP_CHARS).contains(&len) {
                    MotivationalTip {
                        text,
                        source: TipSource::Api,
                        timestamp: self.clock.now_ms(),
                    }
                } else {
                    self.fallback()
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch motivational tip, using fallback");
                self.fallback()
            }
        }
    }

    pub async fn get_multiple_tips(&self, count: usize) -> Vec<MotivationalTip> {
        let mut tips = Vec::with_capacity(count);
        for i in 0..count {
            tips.push(self.get_motivational_tip().await);
            if i + 1 < count && self.generator.is_some() {
                tokio::time::sleep(BATCH_SPACING).await;
            }
        }
        tips
    }

    /// Reuse the last tip while it is younger than the cache TTL.
    pub async fn get_cached_tip(&self) -> MotivationalTip {
        let now = self.clock.now_ms();
        {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(tip) = cache.as_ref() {
                if now - tip.timestamp < self.cache_ttl.num_milliseconds() {
                    return tip.clone();
                }
            }
        }

        let tip = self.get_motivational_tip().await;
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = Some(tip.clone());
        tip
    }

    /// Premium users get generated tips; everyone else gets the static list.
    pub async fn tip_for(&self, premium: bool) -> MotivationalTip {
        if premium {
            self.get_cached_tip().await
        } else {
            self.fallback()
        }
    }

    fn fallback(&self) -> MotivationalTip {
        MotivationalTip {
            text: random_fallback().to_string(),
            source: TipSource::Fallback,
            timestamp: self.clock.now_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::CoreError;
    use crate::tips::FALLBACK_TIPS;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Fixed {
        text: Option<&'static str>,
        calls: AtomicU32,
    }

    impl Fixed {
        fn ok(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                text: Some(text),
                calls: AtomicU32::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                text: None,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl TipGenerator for Fixed {
        async fn generate(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.text.map(str::to_string).ok_or_else(|| CoreError::Upstream {
                service: "test".into(),
                message: "boom".into(),
            })
        }
    }

    #[tokio::test]
    async fn upstream_failure_falls_back() {
        let provider = TipProvider::new(Some(Fixed::failing()));
        for _ in 0..20 {
            let tip = provider.get_motivational_tip().await;
            assert_eq!(tip.source, TipSource::Fallback);
            assert!(!tip.text.is_empty());
            assert!(FALLBACK_TIPS.contains(&tip.text.as_str()));
        }
    }

    #[tokio::test]
    async fn no_generator_means_fallback() {
        let provider = TipProvider::new(None);
        assert_eq!(provider.get_motivational_tip().await.source, TipSource::Fallback);
    }

    #[tokio::test]
    async fn good_generated_text_is_used() {
        let provider = TipProvider::new(Some(Fixed::ok("Stay with it, the next minute is yours.")));
        let tip = provider.get_motivational_tip().await;
        assert_eq!(tip.source, TipSource::Api);
        assert_eq!(tip.text, "Stay with it, the next minute is yours.");
    }

    #[tokio::test]
    async fn out_of_range_lengths_fall_back() {
        let short = TipProvider::new(Some(Fixed::ok("Too short")));
        assert_eq!(short.get_motivational_tip().await.source, TipSource::Fallback);

        let long_text: &'static str = Box::leak("a".repeat(201).into_boxed_str());
        let long = TipProvider::new(Some(Fixed::ok(long_text)));
        assert_eq!(long.get_motivational_tip().await.source, TipSource::Fallback);
    }

    #[tokio::test]
    async fn cache_reuses_until_ttl() {
        let generator = Fixed::ok("Stay with it, the next minute is yours.");
        let clock = Arc::new(ManualClock::default());
        let provider = TipProvider::with_clock(Some(generator.clone()), clock.clone());

        provider.get_cached_tip().await;
        clock.advance(Duration::seconds(299));
        provider.get_cached_tip().await;
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::seconds(2));
        provider.get_cached_tip().await;
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_premium_never_calls_generator() {
        let generator = Fixed::ok("Stay with it, the next minute is yours.");
        let provider = TipProvider::new(Some(generator.clone()));
        let tip = provider.tip_for(false).await;
        assert_eq!(tip.source, TipSource::Fallback);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);

        assert_eq!(provider.tip_for(true).await.source, TipSource::Api);
    }

    #[test]
    fn config_without_key_has_no_generator() {
        let provider = TipProvider::from_config(&TipsConfig::default()).unwrap();
        assert!(!provider.has_generator());

        let keyed = TipsConfig {
            api_key: Some("hf_test".into()),
            ..TipsConfig::default()
        };
        assert!(TipProvider::from_config(&keyed).unwrap().has_generator());
    }

    #[tokio::test(start_paused = true)]
    async fn batch_returns_requested_count() {
        let provider = TipProvider::new(Some(Fixed::failing()));
        let tips = provider.get_multiple_tips(3).await;
        assert_eq!(tips.len(), 3);
    }
}
