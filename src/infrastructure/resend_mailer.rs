//! Transactional email over the Resend HTTP API.
//!
//! Three messages exist: the admin notification for a freshly uploaded
//! payment receipt (with the receipt attached and the one-click confirm and
//! reject links embedded), the customer confirmation, and the customer
//! rejection. A deployment without mail credentials reports `NotConfigured`
//! and callers decide how soft that failure is.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use crate::config::MailConfig;
use crate::domain::errors::MailError;
use crate::domain::order::OrderView;
use crate::domain::ports::{Mailer, ReceiptNotification};

const RESEND_API_BASE: &str = "https://api.resend.com";

pub struct ResendMailer {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    admin_email: Option<String>,
    from_email: String,
    site_url: String,
}

impl ResendMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: RESEND_API_BASE.to_string(),
            api_key: config.api_key.clone(),
            admin_email: config.admin_email.clone(),
            from_email: config.from_email.clone(),
            site_url: config.site_url.clone(),
        }
    }

    async fn post_email(&self, payload: Value) -> Result<(), MailError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MailError::NotConfigured("RESEND_API_KEY is not set".to_string()))?;

        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(MailError::Provider(format!("{status}: {body}")))
        }
    }

    /// Confirm and reject URLs for an order. The shape is frozen: it is
    /// embedded in already-sent emails.
    fn action_urls(&self, order_id: &str, customer_email: &str) -> (String, String) {
        let encoded = BASE64.encode(customer_email);
        (
            format!(
                "{}/order-status/customer-confirm?orderId={order_id}&userEmail={encoded}",
                self.site_url
            ),
            format!(
                "{}/order-status/customer-reject?orderId={order_id}&userEmail={encoded}",
                self.site_url
            ),
        )
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_receipt_notification(
        &self,
        notification: ReceiptNotification,
    ) -> Result<(), MailError> {
        let admin_email = self
            .admin_email
            .as_deref()
            .ok_or_else(|| MailError::NotConfigured("ADMIN_EMAIL is not set".to_string()))?;

        let order = &notification.order;
        let attachment = notification
            .receipt_data_url
            .split_once(',')
            .map(|(_, content)| content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                MailError::InvalidMessage(
                    "receipt data URI carries no base64 content".to_string(),
                )
            })?;

        let order_id = order.id.to_string();
        let customer_email = &order.shipping_info.email;
        let (confirm_url, reject_url) = self.action_urls(&order_id, customer_email);

        let html = format!(
            "<h1>New payment receipt for order {id}</h1>\
             <p><strong>Customer email:</strong> {email}</p>\
             <h2>Order details:</h2>{details}\
             <p>The receipt is attached to this email.</p><hr>\
             <h2>Order actions:</h2>\
             <p>Please confirm or reject this order. The customer will be notified by email.</p>\
             <p><a href=\"{confirm}\">Confirm the order</a> &nbsp; \
             <a href=\"{reject}\">Reject the order</a></p>\
             <p style=\"font-size:12px;color:#666\">If the links do not work, copy and paste:<br>\
             Confirm: {confirm}<br>Reject: {reject}</p>",
            id = escape_html(&order_id),
            email = escape_html(customer_email),
            details = order_details_html(order),
            confirm = escape_html(&confirm_url),
            reject = escape_html(&reject_url),
        );

        self.post_email(json!({
            "from": self.from_email,
            "to": [admin_email],
            "subject": format!("New receipt for order {order_id}"),
            "html": html,
            "attachments": [{
                "filename": format!("receipt-{order_id}.jpg"),
                "content": attachment,
            }],
        }))
        .await
    }

    async fn send_customer_confirmation(
        &self,
        to: &str,
        order_id: &str,
    ) -> Result<(), MailError> {
        let html = format!(
            "<h1>Your order has been confirmed!</h1>\
             <p>Hello,</p>\
             <p>Good news! Your order <strong>#{id}</strong> has been confirmed by our team.</p>\
             <p>It will be prepared and shipped as soon as possible. You can check the updated \
             status in your order history.</p>\
             <p>Thank you for your trust.</p>",
            id = escape_html(order_id)
        );
        self.post_email(json!({
            "from": self.from_email,
            "to": [to],
            "subject": format!("Your order #{order_id} is confirmed!"),
            "html": html,
        }))
        .await
    }

    async fn send_customer_rejection(&self, to: &str, order_id: &str) -> Result<(), MailError> {
        let html = format!(
            "<h1>There was a problem with your order</h1>\
             <p>Hello,</p>\
             <p>We are contacting you about your order <strong>#{id}</strong>.</p>\
             <p>Unfortunately we could not validate your payment and the order has been \
             rejected. You can check the updated status in your order history.</p>\
             <p>Please contact customer support for more information or to place the order \
             again. We apologize for the inconvenience.</p>",
            id = escape_html(order_id)
        );
        self.post_email(json!({
            "from": self.from_email,
            "to": [to],
            "subject": format!("About your order #{order_id}"),
            "html": html,
        }))
        .await
    }
}

fn order_details_html(order: &OrderView) -> String {
    let mut rows = String::new();
    for item in &order.items {
        let mut variant = String::new();
        if let Some(size) = &item.size {
            variant.push_str(&format!(" (size {})", escape_html(size)));
        }
        if let Some(color) = &item.color {
            variant.push_str(&format!(" ({})", escape_html(color)));
        }
        rows.push_str(&format!(
            "<tr><td>{}{}</td><td>{}</td><td>€{}</td></tr>",
            escape_html(&item.name),
            variant,
            item.quantity,
            item.price
        ));
    }
    format!(
        "<table><tr><th>Item</th><th>Qty</th><th>Price</th></tr>{rows}</table>\
         <p>Subtotal: €{} · Shipping: €{} · Taxes: €{} · <strong>Total: €{}</strong></p>",
        order.subtotal, order.shipping, order.taxes, order.total_amount
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::order::{OrderItem, PaymentStatus, ShippingInfo, ShippingStatus};

    fn config(api_key: Option<&str>, admin: Option<&str>) -> MailConfig {
        MailConfig {
            api_key: api_key.map(str::to_string),
            admin_email: admin.map(str::to_string),
            from_email: "Shop <onboarding@resend.dev>".to_string(),
            site_url: "https://shop.example".to_string(),
        }
    }

    fn order() -> OrderView {
        OrderView {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            shipping_info: ShippingInfo {
                name: "Jamie Doe".to_string(),
                email: "jamie@example.com".to_string(),
                address: "1 Hauptstraße".to_string(),
                city: "Berlin".to_string(),
                zip: "10115".to_string(),
                country: "Germany".to_string(),
            },
            items: vec![OrderItem {
                id: "cart-1".to_string(),
                product_id: "prod-1".to_string(),
                name: "Robe <d'été>".to_string(),
                name_fr: "Robe d'été".to_string(),
                name_en: "Summer dress".to_string(),
                price: "110".parse().unwrap(),
                quantity: 1,
                size: Some("S".to_string()),
                color: None,
                image: "https://img.example/dress.jpg".to_string(),
            }],
            subtotal: "110".parse().unwrap(),
            shipping: "0".parse().unwrap(),
            taxes: "20.90".parse().unwrap(),
            total_amount: "130.90".parse().unwrap(),
            payment_status: PaymentStatus::Processing,
            receipt_image_url: Some("https://cdn.example/r.jpg".to_string()),
            shipping_status: ShippingStatus::Preparing,
            tracking_number: None,
            shipped_at: None,
            delivered_at: None,
            order_date: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_api_key_reports_not_configured() {
        let mailer = ResendMailer::new(&config(None, Some("admin@shop.example")));
        let err = mailer
            .send_customer_confirmation("jamie@example.com", "abc")
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn missing_admin_address_reports_not_configured() {
        let mailer = ResendMailer::new(&config(Some("re_test"), None));
        let err = mailer
            .send_receipt_notification(ReceiptNotification {
                order: order(),
                receipt_data_url: "data:image/jpeg;base64,AAAA".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn receipt_without_base64_content_is_invalid() {
        let mailer = ResendMailer::new(&config(Some("re_test"), Some("admin@shop.example")));
        for bad in ["no-comma-here", "data:image/jpeg;base64,"] {
            let err = mailer
                .send_receipt_notification(ReceiptNotification {
                    order: order(),
                    receipt_data_url: bad.to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, MailError::InvalidMessage(_)), "{bad}");
        }
    }

    #[test]
    fn action_urls_follow_the_frozen_contract() {
        let mailer = ResendMailer::new(&config(Some("re_test"), Some("admin@shop.example")));
        let (confirm, reject) = mailer.action_urls("abc-123", "jamie@example.com");
        let encoded = BASE64.encode("jamie@example.com");
        assert_eq!(
            confirm,
            format!(
                "https://shop.example/order-status/customer-confirm?orderId=abc-123&userEmail={encoded}"
            )
        );
        assert_eq!(
            reject,
            format!(
                "https://shop.example/order-status/customer-reject?orderId=abc-123&userEmail={encoded}"
            )
        );
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#039;"
        );
    }

    #[test]
    fn order_details_include_items_and_totals() {
        let html = order_details_html(&order());
        assert!(html.contains("Robe &lt;d&#039;été&gt;"));
        assert!(html.contains("(size S)"));
        assert!(html.contains("Total: €130.90"));
    }
}
