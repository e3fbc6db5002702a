//! Fixed per-event message templates. Interpolation is limited to the
//! identifying fields; anything richer belongs to a template service.

pub fn order_created_email(order_id: &str) -> (String, String) {
    (
        format!("Order Confirmation - Order #{}", order_id),
        format!(
            "<h1>Order Confirmation</h1><p>Thank you for your order!</p>\
             <p>Order ID: <strong>{}</strong></p><p>We will process it shortly.</p>",
            order_id
        ),
    )
}

pub fn order_cancelled_email(order_id: &str) -> (String, String) {
    (
        format!("Order Cancelled - Order #{}", order_id),
        format!(
            "<h1>Order Cancelled</h1><p>Your order #{} has been cancelled as requested.</p>",
            order_id
        ),
    )
}

pub fn payment_success_email(order_id: &str, amount: &str) -> (String, String) {
    (
        format!("Payment Receipt - Order #{}", order_id),
        format!(
            "<h1>Payment Successful</h1><p>We received your payment for Order ID: \
             <strong>{}</strong></p><p>Amount: {}</p>",
            order_id, amount
        ),
    )
}

pub fn payment_failed_email(order_id: &str) -> (String, String) {
    (
        format!("Payment Failed - Order #{}", order_id),
        format!(
            "<h1>Payment Failed</h1><p>We could not process payment for order #{}. \
             Please try again.</p>",
            order_id
        ),
    )
}

pub fn payment_failed_sms(order_id: &str) -> String {
    format!(
        "Payment for order #{} failed. Please retry or contact support.",
        order_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_created_email_contains_order_id() {
        let (subject, body) = order_created_email("ORD-42");
        assert!(subject.contains("ORD-42"));
        assert!(body.contains("ORD-42"));
    }

    #[test]
    fn test_payment_success_email_contains_amount() {
        let (_, body) = payment_success_email("ORD-42", "19.99");
        assert!(body.contains("19.99"));
    }

    #[test]
    fn test_payment_failed_sms_contains_order_id() {
        let text = payment_failed_sms("ORD-42");
        assert!(text.contains("ORD-42"));
    }
}
