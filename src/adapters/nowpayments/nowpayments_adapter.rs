//! NOWPayments crypto payment provider.
//!
//! Price is quoted in a fiat currency and paid in a crypto asset. NOWPayments
//! does not report an expiry, so a fixed 30-minute window from creation is
//! assumed.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{
    usd_amount, Metadata, ProviderKind, ProviderPaymentCreateRequest, ProviderPaymentDetails,
};
use crate::ports::{
    NowPaymentsClient, NowPaymentsCreatePayment, NowPaymentsPayment, PaymentError,
    PaymentProvider,
};

use super::order_id::fallback_order_id;
use super::status::map_nowpayments_status;

/// Minutes a crypto payment stays payable after creation.
pub const PAYMENT_EXPIRY_MINUTES: i64 = 30;

/// Settings for [`NowPaymentsProvider`].
#[derive(Debug, Clone)]
pub struct NowPaymentsProviderConfig {
    /// IPN callback URL sent with every payment.
    pub ipn_callback_url: String,

    /// Reject requests without an `order_id` instead of generating one.
    pub require_order_id: bool,
}

impl NowPaymentsProviderConfig {
    pub fn new(ipn_callback_url: impl Into<String>) -> Self {
        Self {
            ipn_callback_url: ipn_callback_url.into(),
            require_order_id: false,
        }
    }

    pub fn with_required_order_id(mut self, required: bool) -> Self {
        self.require_order_id = required;
        self
    }
}

/// Crypto payment provider backed by a [`NowPaymentsClient`].
pub struct NowPaymentsProvider {
    client: Arc<dyn NowPaymentsClient>,
    config: NowPaymentsProviderConfig,
}

impl NowPaymentsProvider {
    pub fn new(client: Arc<dyn NowPaymentsClient>, config: NowPaymentsProviderConfig) -> Self {
        Self { client, config }
    }

    fn resolve_order_id(
        &self,
        request: &ProviderPaymentCreateRequest,
        now: &Timestamp,
    ) -> Result<String, PaymentError> {
        if let Some(order_id) = &request.order_id {
            return Ok(order_id.clone());
        }
        if self.config.require_order_id {
            return Err(PaymentError::missing_order_id());
        }

        let order_id = fallback_order_id(&request.user_id, now);
        tracing::warn!(
            user_id = %request.user_id,
            order_id = %order_id,
            "Crypto payment created without order id, using generated id"
        );
        Ok(order_id)
    }
}

#[async_trait]
impl PaymentProvider for NowPaymentsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::NowPayments
    }

    async fn create_payment(
        &self,
        request: ProviderPaymentCreateRequest,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        request.validate()?;

        let now = Timestamp::now();
        let order_id = self.resolve_order_id(&request, &now)?;
        let price_currency = request.price_currency.to_lowercase();
        let pay_currency = request.pay_currency.to_lowercase();

        let payment = self
            .client
            .create_payment(NowPaymentsCreatePayment {
                price_amount: request.amount,
                price_currency: price_currency.clone(),
                pay_currency: pay_currency.clone(),
                order_id: order_id.clone(),
                order_description: request.description.clone(),
                ipn_callback_url: Some(self.config.ipn_callback_url.clone()),
            })
            .await?;

        let mut metadata = request.metadata;
        metadata.insert("order_id".to_string(), Value::String(order_id.clone()));

        let details = ProviderPaymentDetails {
            provider: ProviderKind::NowPayments,
            normalized_status: map_nowpayments_status(&payment.payment_status),
            provider_payment_id: payment.payment_id,
            provider_status: payment.payment_status,
            amount: request.amount,
            amount_usd: usd_amount(request.amount, &price_currency),
            price_currency,
            pay_currency,
            pay_amount: payment.pay_amount,
            pay_address: payment.pay_address,
            expires_at: Some(now.plus_minutes(PAYMENT_EXPIRY_MINUTES)),
            client_secret: None,
            metadata,
            raw: payment.raw,
        };

        tracing::info!(
            payment_id = %details.provider_payment_id,
            user_id = %request.user_id,
            order_id = %order_id,
            amount = details.amount,
            price_currency = %details.price_currency,
            pay_currency = %details.pay_currency,
            status = %details.normalized_status,
            "NOWPayments payment created"
        );

        Ok(details)
    }

    async fn get_payment_status(
        &self,
        provider_payment_id: &str,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        let payment = self.client.get_payment_status(provider_payment_id).await?;
        let details = details_from_payment(payment)?;

        tracing::debug!(
            payment_id = %details.provider_payment_id,
            status = %details.provider_status,
            "NOWPayments payment retrieved"
        );

        Ok(details)
    }

    async fn supports_currency(&self, currency: &str) -> Result<bool, PaymentError> {
        self.client.is_currency_supported(currency).await
    }
}

/// Normalizes a looked-up NOWPayments payment.
///
/// Expiry is derived from the provider's `created_at`; without it none is set.
pub fn details_from_payment(payment: NowPaymentsPayment) -> Result<ProviderPaymentDetails, PaymentError> {
    let amount = payment.price_amount.ok_or_else(|| {
        PaymentError::provider(format!(
            "NOWPayments payment {} has no price_amount",
            payment.payment_id
        ))
    })?;
    let price_currency = payment
        .price_currency
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let pay_currency = payment
        .pay_currency
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let mut metadata = Metadata::new();
    if let Some(order_id) = payment.order_id {
        metadata.insert("order_id".to_string(), Value::String(order_id));
    }

    Ok(ProviderPaymentDetails {
        provider: ProviderKind::NowPayments,
        normalized_status: map_nowpayments_status(&payment.payment_status),
        provider_payment_id: payment.payment_id,
        provider_status: payment.payment_status,
        amount,
        amount_usd: usd_amount(amount, &price_currency),
        price_currency,
        pay_currency,
        pay_amount: payment.pay_amount,
        pay_address: payment.pay_address,
        expires_at: payment
            .created_at
            .map(|created| Timestamp::from(created).plus_minutes(PAYMENT_EXPIRY_MINUTES)),
        client_secret: None,
        metadata,
        raw: payment.raw,
    })
}
