//! Security-focused logging module to track authentication and authorization events
//!
//! Callers only ever see a generic 401; the precise failure reason lands here.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::AuthFailure;

/// Types of security events to track
#[derive(Debug, Clone)]
pub enum SecurityEvent {
    // Authentication events
    AuthenticationFailed { email: Option<String>, addr: Option<SocketAddr>, reason: AuthFailure },
    AuthenticationSuccess { user_id: i64, addr: Option<SocketAddr> },
    TokenValidationFailed { addr: Option<SocketAddr>, reason: AuthFailure },

    // Authorization events
    PermissionDenied { user_id: i64, action: String, resource: String },

    // Registration
    RegistrationRejected { email: String, reason: String },
}

/// Security event with timestamp
#[derive(Debug, Clone)]
struct TimestampedEvent {
    event: SecurityEvent,
    timestamp: Instant,
}

/// Security logger for tracking and alerting on security events
pub struct SecurityLogger {
    events: RwLock<Vec<TimestampedEvent>>,
    event_counts: RwLock<HashMap<&'static str, usize>>,
    max_events: usize,
    alert_thresholds: HashMap<&'static str, usize>,
}

impl SecurityLogger {
    /// Create a new security logger
    pub fn new() -> Self {
        let mut alert_thresholds = HashMap::new();
        alert_thresholds.insert("auth_failed", 5);
        alert_thresholds.insert("token_validation_failed", 10);
        alert_thresholds.insert("permission_denied", 20);

        Self {
            events: RwLock::new(Vec::new()),
            event_counts: RwLock::new(HashMap::new()),
            max_events: 10000,
            alert_thresholds,
        }
    }

    /// Log a security event
    pub async fn log_event(&self, event: SecurityEvent) {
        let event_key = Self::event_key(&event);

        {
            let mut events = self.events.write().await;
            events.push(TimestampedEvent {
                event: event.clone(),
                timestamp: Instant::now(),
            });

            // Limit memory usage
            if events.len() > self.max_events {
                let events_to_remove = events.len() - self.max_events;
                events.drain(0..events_to_remove);
            }
        }

        // Update counters and check for alerts
        {
            let mut counts = self.event_counts.write().await;
            let count = counts.entry(event_key).or_insert(0);
            *count += 1;

            if let Some(&threshold) = self.alert_thresholds.get(event_key) {
                if *count % threshold == 0 {
                    log::error!("SECURITY ALERT: {} events of type '{}' detected", count, event_key);
                    log::error!("Sample event: {:?}", event);
                }
            }
        }

        match event {
            SecurityEvent::AuthenticationFailed { email, addr, reason } => {
                log::warn!("SECURITY: Login failed - Email: {:?}, Addr: {:?}, Reason: {}", email, addr, reason);
            }
            SecurityEvent::AuthenticationSuccess { user_id, addr } => {
                log::info!("SECURITY: Login success - User: {}, Addr: {:?}", user_id, addr);
            }
            SecurityEvent::TokenValidationFailed { addr, reason } => {
                log::warn!("SECURITY: Token validation failed - Addr: {:?}, Reason: {}", addr, reason);
            }
            SecurityEvent::PermissionDenied { user_id, action, resource } => {
                log::warn!("SECURITY: Permission denied - User: {}, Action: {}, Resource: {}", user_id, action, resource);
            }
            SecurityEvent::RegistrationRejected { email, reason } => {
                log::info!("SECURITY: Registration rejected - Email: {}, Reason: {}", email, reason);
            }
        }
    }

    fn event_key(event: &SecurityEvent) -> &'static str {
        match event {
            SecurityEvent::AuthenticationFailed { .. } => "auth_failed",
            SecurityEvent::AuthenticationSuccess { .. } => "auth_success",
            SecurityEvent::TokenValidationFailed { .. } => "token_validation_failed",
            SecurityEvent::PermissionDenied { .. } => "permission_denied",
            SecurityEvent::RegistrationRejected { .. } => "registration_rejected",
        }
    }

    /// Get recent security events
    pub async fn get_recent_events(&self, duration: Duration) -> Vec<SecurityEvent> {
        let events = self.events.read().await;
        let now = Instant::now();

        events
            .iter()
            .filter(|event| now.duration_since(event.timestamp) <= duration)
            .map(|event| event.event.clone())
            .collect()
    }

    /// Get event statistics
    pub async fn get_event_stats(&self) -> HashMap<&'static str, usize> {
        self.event_counts.read().await.clone()
    }

    /// Clean up old events
    pub async fn cleanup_old_events(&self, max_age: Duration) {
        let mut events = self.events.write().await;
        let now = Instant::now();

        events.retain(|event| now.duration_since(event.timestamp) <= max_age);
    }

    /// Start periodic cleanup task
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300)); // Every 5 minutes
            loop {
                interval.tick().await;
                self.cleanup_old_events(Duration::from_secs(3600 * 24)).await; // Keep 24 hours
            }
        });
    }
}

impl Default for SecurityLogger {
    fn default() -> Self {
        Self::new()
    }
}
