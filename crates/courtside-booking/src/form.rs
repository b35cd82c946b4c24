//! Two-stage reservation form filling: player details, then payment
//!
//! Neither stage submits. The attempt state machine presses the buttons
//! around them, since only it knows whether the run is a dry-run.

use async_trait::async_trait;
use courtside_core::{
    CourtsideError, Credentials, FormVariant, FrameRef, PageAutomation, Result, SettleDelays,
};
use tracing::debug;

use crate::selectors::{self, field};

/// Venue-specific player identification on the details form
#[async_trait]
pub trait IdentificationFiller: Send + Sync {
    async fn fill_identification(
        &self,
        page: &dyn PageAutomation,
        credentials: &Credentials,
    ) -> Result<()>;
}

/// Central Park: permit number, then name into `name1`
pub struct PermitNumberIdentification;

/// Other venues: "existing permit" toggle, then name into `name`
pub struct ExistingPermitIdentification;

#[async_trait]
impl IdentificationFiller for PermitNumberIdentification {
    async fn fill_identification(
        &self,
        page: &dyn PageAutomation,
        credentials: &Credentials,
    ) -> Result<()> {
        fill(page, field::PERMIT_NUMBER, &credentials.permit_number).await?;
        fill(page, field::CENTRAL_PARK_NAME, &credentials.name).await
    }
}

#[async_trait]
impl IdentificationFiller for ExistingPermitIdentification {
    async fn fill_identification(
        &self,
        page: &dyn PageAutomation,
        credentials: &Credentials,
    ) -> Result<()> {
        toggle(page, field::EXISTING_PERMIT).await?;
        fill(page, field::NAME, &credentials.name).await
    }
}

/// Identification strategy for a form variant
pub fn identification_for(variant: FormVariant) -> &'static dyn IdentificationFiller {
    match variant {
        FormVariant::CentralPark => &PermitNumberIdentification,
        FormVariant::General => &ExistingPermitIdentification,
    }
}

/// Map a missing-element failure onto the form field it concerns
fn field_error(id: &str, err: CourtsideError) -> CourtsideError {
    match err {
        CourtsideError::ElementNotFound { .. } => CourtsideError::FormFieldNotFound(id.to_string()),
        other => other,
    }
}

async fn fill(page: &dyn PageAutomation, id: &str, value: &str) -> Result<()> {
    debug!("Filling {}", id);
    page.type_text(&selectors::input(id), value)
        .await
        .map_err(|e| field_error(id, e))
}

async fn toggle(page: &dyn PageAutomation, id: &str) -> Result<()> {
    debug!("Toggling {}", id);
    page.click(&selectors::input(id))
        .await
        .map_err(|e| field_error(id, e))
}

/// Fills the player-details and payment forms for one venue
pub struct ReservationFormPipeline<'a> {
    page: &'a dyn PageAutomation,
    credentials: &'a Credentials,
    identification: &'static dyn IdentificationFiller,
    payment_frame: FrameRef,
    delays: SettleDelays,
}

impl<'a> ReservationFormPipeline<'a> {
    pub fn new(
        page: &'a dyn PageAutomation,
        credentials: &'a Credentials,
        variant: FormVariant,
        payment_frame: FrameRef,
        delays: SettleDelays,
    ) -> Self {
        Self {
            page,
            credentials,
            identification: identification_for(variant),
            payment_frame,
            delays,
        }
    }

    /// Stage A: player count, identification, then shared contact fields
    pub async fn fill_player_details(&self) -> Result<()> {
        toggle(self.page, field::NUM_PLAYERS).await?;
        // the page validates the player count asynchronously
        tokio::time::sleep(self.delays.short()).await;

        self.identification
            .fill_identification(self.page, self.credentials)
            .await?;

        let c = self.credentials;
        for (id, value) in [
            (field::EMAIL, &c.email),
            (field::ADDRESS, &c.address),
            (field::CITY, &c.city),
            (field::ZIP, &c.zip_code),
            (field::PHONE, &c.phone),
        ] {
            fill(self.page, id, value).await?;
        }
        Ok(())
    }

    /// Stage B: card details inside the payment frame
    ///
    /// Leaves the page scoped to the payment frame, where the final
    /// "Pay Now" control lives.
    pub async fn fill_payment_details(&self) -> Result<()> {
        self.page.switch_to_frame(&self.payment_frame).await?;

        let c = self.credentials;
        for (id, value) in [
            (field::CC_NUMBER, &c.cc_number),
            (field::EXP_MONTH, &c.exp_month),
            (field::EXP_YEAR, &c.exp_year),
            (field::CVV, &c.csc),
        ] {
            fill(self.page, id, value).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Interaction, MockPage, PageScript};
    use courtside_core::Locator;

    const SLOT: &str = "https://book.test/slot";

    fn credentials() -> Credentials {
        Credentials {
            name: "Pat Player".to_string(),
            email: "pat@example.com".to_string(),
            address: "1 Court St".to_string(),
            city: "New York".to_string(),
            zip_code: "10001".to_string(),
            phone: "5550100".to_string(),
            permit_number: "P-42".to_string(),
            cc_number: "4111111111111111".to_string(),
            exp_month: "01".to_string(),
            exp_year: "2030".to_string(),
            csc: "123".to_string(),
        }
    }

    async fn booking_page(variant: FormVariant) -> MockPage {
        let page = MockPage::new().with_page(
            SLOT,
            PageScript::booking_page(variant, FrameRef::Index(3)),
        );
        page.navigate(SLOT).await.unwrap();
        page
    }

    fn typed_ids(page: &MockPage) -> Vec<Locator> {
        page.typed()
    }

    #[tokio::test]
    async fn test_central_park_fills_permit_and_name1() {
        let page = booking_page(FormVariant::CentralPark).await;
        let creds = credentials();
        let pipeline = ReservationFormPipeline::new(
            &page,
            &creds,
            FormVariant::CentralPark,
            FrameRef::Index(3),
            SettleDelays::none(),
        );

        pipeline.fill_player_details().await.unwrap();

        let expected: Vec<Locator> = [
            field::PERMIT_NUMBER,
            field::CENTRAL_PARK_NAME,
            field::EMAIL,
            field::ADDRESS,
            field::CITY,
            field::ZIP,
            field::PHONE,
        ]
        .iter()
        .map(|id| selectors::input(id))
        .collect();
        assert_eq!(typed_ids(&page), expected);
        assert_eq!(page.clicks(), vec![selectors::input(field::NUM_PLAYERS)]);
        assert!(page.interactions().contains(&Interaction::Type(
            selectors::input(field::CENTRAL_PARK_NAME),
            "Pat Player".to_string()
        )));
    }

    #[tokio::test]
    async fn test_general_toggles_existing_permit_and_fills_name() {
        let page = booking_page(FormVariant::General).await;
        let creds = credentials();
        let pipeline = ReservationFormPipeline::new(
            &page,
            &creds,
            FormVariant::General,
            FrameRef::Index(3),
            SettleDelays::none(),
        );

        pipeline.fill_player_details().await.unwrap();

        assert_eq!(
            page.clicks(),
            vec![
                selectors::input(field::NUM_PLAYERS),
                selectors::input(field::EXISTING_PERMIT),
            ]
        );
        let typed = typed_ids(&page);
        assert_eq!(typed[0], selectors::input(field::NAME));
        assert_eq!(typed.len(), 6);
        assert!(!typed.contains(&selectors::input(field::PERMIT_NUMBER)));
    }

    #[tokio::test]
    async fn test_missing_field_surfaces_as_form_field_error() {
        let page = MockPage::new().with_page(
            SLOT,
            PageScript::booking_page(FormVariant::General, FrameRef::Index(3))
                .without_element(&selectors::input(field::CITY)),
        );
        page.navigate(SLOT).await.unwrap();
        let creds = credentials();
        let pipeline = ReservationFormPipeline::new(
            &page,
            &creds,
            FormVariant::General,
            FrameRef::Index(3),
            SettleDelays::none(),
        );

        let err = pipeline.fill_player_details().await.unwrap_err();
        assert!(matches!(err, CourtsideError::FormFieldNotFound(id) if id == field::CITY));
    }

    #[tokio::test]
    async fn test_variant_mismatch_is_detected() {
        let page = booking_page(FormVariant::General).await;
        let creds = credentials();
        let pipeline = ReservationFormPipeline::new(
            &page,
            &creds,
            FormVariant::CentralPark,
            FrameRef::Index(3),
            SettleDelays::none(),
        );

        let err = pipeline.fill_player_details().await.unwrap_err();
        assert!(matches!(err, CourtsideError::FormFieldNotFound(id) if id == field::PERMIT_NUMBER));
    }

    #[tokio::test]
    async fn test_payment_details_go_into_payment_frame() {
        let page = booking_page(FormVariant::CentralPark).await;
        let creds = credentials();
        let pipeline = ReservationFormPipeline::new(
            &page,
            &creds,
            FormVariant::CentralPark,
            FrameRef::Index(3),
            SettleDelays::none(),
        );

        pipeline.fill_payment_details().await.unwrap();

        let interactions = page.interactions();
        assert_eq!(interactions[1], Interaction::SwitchToFrame(FrameRef::Index(3)));
        assert_eq!(
            typed_ids(&page),
            vec![
                selectors::input(field::CC_NUMBER),
                selectors::input(field::EXP_MONTH),
                selectors::input(field::EXP_YEAR),
                selectors::input(field::CVV),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_payment_frame() {
        let page = booking_page(FormVariant::CentralPark).await;
        let creds = credentials();
        let pipeline = ReservationFormPipeline::new(
            &page,
            &creds,
            FormVariant::CentralPark,
            FrameRef::Name("tokenFrame".to_string()),
            SettleDelays::none(),
        );

        let err = pipeline.fill_payment_details().await.unwrap_err();
        assert!(matches!(err, CourtsideError::FrameNotFound(_)));
        assert!(page.typed().is_empty());
    }
}
