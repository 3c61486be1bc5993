use crate::domain::custom_order::{CustomOrder, ProjectType};
use crate::domain::ports::{
    CustomOrderStoreRef, Notification, NotificationEvent, NotifierRef,
};
use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CustomOrderRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub project_type: ProjectType,
    pub brief: String,
    pub budget: Option<String>,
    pub gst_number: Option<String>,
}

/// Handles custom-pottery intake: validate, persist, notify both sides.
pub struct IntakeService {
    requests: CustomOrderStoreRef,
    notifier: NotifierRef,
    company_email: String,
}

impl IntakeService {
    pub fn new(requests: CustomOrderStoreRef, notifier: NotifierRef, company_email: String) -> Self {
        Self {
            requests,
            notifier,
            company_email,
        }
    }

    pub async fn submit(&self, req: CustomOrderRequest) -> Result<CustomOrder> {
        validate_contact(&req.name, &req.email, &req.phone)?;
        if req.brief.trim().is_empty() {
            return Err(AppError::Validation(
                "project brief must not be empty".to_string(),
            ));
        }

        let request = CustomOrder::new(
            req.name,
            req.email,
            req.phone,
            req.project_type,
            req.brief,
            req.budget,
            req.gst_number,
        );
        self.requests.insert(request.clone()).await?;

        info!(
            request_number = %request.request_number,
            customer_email = %request.email,
            "custom order received"
        );

        let ctx = request_context(&request);
        self.notifier
            .notify(Notification {
                event: NotificationEvent::CustomOrderReceived,
                recipient: request.email.clone(),
                context: ctx.clone(),
            })
            .await;
        self.notifier
            .notify(Notification {
                event: NotificationEvent::CustomOrderAdminAlert,
                recipient: self.company_email.clone(),
                context: ctx,
            })
            .await;

        Ok(request)
    }
}

fn validate_contact(name: &str, email: &str, phone: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| AppError::Validation("invalid email address".to_string()))?;
    if local.is_empty() || !domain.contains('.') {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '+'))
        .collect();
    if digits.len() < 10 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "invalid phone number".to_string(),
        ));
    }
    Ok(())
}

fn request_context(request: &CustomOrder) -> BTreeMap<String, String> {
    let mut ctx = BTreeMap::new();
    ctx.insert(
        "request_number".to_string(),
        request.request_number.clone(),
    );
    ctx.insert("customer_name".to_string(), request.name.clone());
    ctx.insert("customer_email".to_string(), request.email.clone());
    ctx.insert("customer_phone".to_string(), request.phone.clone());
    ctx.insert(
        "project_type".to_string(),
        format!("{:?}", request.project_type).to_lowercase(),
    );
    ctx.insert("brief".to_string(), request.brief.clone());
    if let Some(budget) = &request.budget {
        ctx.insert("budget".to_string(), budget.clone());
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{CustomOrderStore, Notifier};
    use crate::infrastructure::in_memory::InMemoryCustomOrderStore;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        notes: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, note: Notification) {
            self.notes.lock().await.push(note);
        }
    }

    fn request() -> CustomOrderRequest {
        CustomOrderRequest {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765-43210".to_string(),
            project_type: ProjectType::Event,
            brief: "Dinner set for a wedding, 40 guests".to_string(),
            budget: Some("25000-50000".to_string()),
            gst_number: None,
        }
    }

    fn service() -> (IntakeService, Arc<InMemoryCustomOrderStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(InMemoryCustomOrderStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = IntakeService::new(
            store.clone(),
            notifier.clone(),
            "studio@example.com".to_string(),
        );
        (service, store, notifier)
    }

    #[tokio::test]
    async fn test_submit_persists_and_notifies_both_sides() {
        let (service, store, notifier) = service();
        let request = service.submit(request()).await.unwrap();

        assert!(store.get(&request.request_number).await.unwrap().is_some());

        let notes = notifier.notes.lock().await;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].event, NotificationEvent::CustomOrderReceived);
        assert_eq!(notes[0].recipient, "asha@example.com");
        assert_eq!(notes[1].event, NotificationEvent::CustomOrderAdminAlert);
        assert_eq!(notes[1].recipient, "studio@example.com");
    }

    #[tokio::test]
    async fn test_rejects_bad_email() {
        let (service, _, _) = service();
        let mut bad = request();
        bad.email = "not-an-email".to_string();
        assert!(matches!(
            service.submit(bad).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_short_phone() {
        let (service, _, _) = service();
        let mut bad = request();
        bad.phone = "12345".to_string();
        assert!(matches!(
            service.submit(bad).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_empty_brief() {
        let (service, _, _) = service();
        let mut bad = request();
        bad.brief = "   ".to_string();
        assert!(matches!(
            service.submit(bad).await,
            Err(AppError::Validation(_))
        ));
    }
}
