//! In-memory collaborators shared by the unit tests

use crate::api::{
    ButtonApi, ClientConfigUpdate, GraphqlBatch, GraphqlRequest, ValidatePaymentMethodRequest,
    ValidatePaymentMethodResponse,
};
use crate::button::props::{ApproveActions, ApproveData, CreateOrder, Props, ServiceData};
use crate::components::{
    ButtonUi, Component, ComponentInstance, ComponentProps, Components, NativeLauncher,
    NativeOutcome, PopupBridge, PopupBridgeOp, PopupBridgeResult, PopupOpener, PopupWindow,
    RenderContext, RenderTarget, WindowHandle,
};
use crate::config::{ButtonConfig, Environment, WindowTopology};
use crate::eligibility::RequestInfo;
use crate::flows::ButtonContext;
use crate::telemetry::{Logger, TelemetryEvent, TelemetrySink};
use crate::types::ButtonRef;
use crate::{ButtonError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub struct MockWindow {
    closed: AtomicBool,
}

impl PopupWindow for MockWindow {
    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MockPopupOpener {
    opened: Mutex<Vec<Arc<MockWindow>>>,
}

impl MockPopupOpener {
    pub fn opened_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn last_window(&self) -> Arc<MockWindow> {
        self.opened.lock().unwrap().last().cloned().unwrap()
    }
}

impl PopupOpener for MockPopupOpener {
    fn open_popup(&self, _width: u32, _height: u32) -> Result<WindowHandle> {
        let win = Arc::new(MockWindow {
            closed: AtomicBool::new(false),
        });
        self.opened.lock().unwrap().push(win.clone());
        Ok(win)
    }
}

pub fn mock_window() -> WindowHandle {
    Arc::new(MockWindow {
        closed: AtomicBool::new(false),
    })
}

#[derive(Default)]
pub struct MockComponentInstance {
    renders: Mutex<Vec<(RenderTarget, RenderContext)>>,
    closes: AtomicUsize,
    fail_render: bool,
}

impl MockComponentInstance {
    pub fn renders(&self) -> Vec<(RenderTarget, RenderContext)> {
        self.renders.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComponentInstance for MockComponentInstance {
    async fn render_to(&self, target: RenderTarget, context: RenderContext) -> Result<()> {
        if self.fail_render {
            return Err(ButtonError::component("render failed"));
        }
        self.renders.lock().unwrap().push((target, context));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockComponent {
    can_render_top: AtomicBool,
    fail_render_check: AtomicBool,
    fail_render: AtomicBool,
    render_checks: AtomicUsize,
    props: Mutex<Vec<ComponentProps>>,
    instances: Mutex<Vec<Arc<MockComponentInstance>>>,
}

impl Default for MockComponent {
    fn default() -> Self {
        Self {
            can_render_top: AtomicBool::new(true),
            fail_render_check: AtomicBool::new(false),
            fail_render: AtomicBool::new(false),
            render_checks: AtomicUsize::new(0),
            props: Mutex::new(Vec::new()),
            instances: Mutex::new(Vec::new()),
        }
    }
}

impl MockComponent {
    pub fn fail_render_check(&self) {
        self.fail_render_check.store(true, Ordering::SeqCst);
    }

    pub fn fail_render(&self) {
        self.fail_render.store(true, Ordering::SeqCst);
    }

    pub fn render_check_count(&self) -> usize {
        self.render_checks.load(Ordering::SeqCst)
    }

    pub fn init_count(&self) -> usize {
        self.props.lock().unwrap().len()
    }

    pub fn last_props(&self) -> ComponentProps {
        self.props.lock().unwrap().last().cloned().unwrap()
    }

    pub fn last_instance(&self) -> Arc<MockComponentInstance> {
        self.instances.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Component for MockComponent {
    async fn can_render_to(&self, _target: RenderTarget) -> Result<bool> {
        self.render_checks.fetch_add(1, Ordering::SeqCst);
        if self.fail_render_check.load(Ordering::SeqCst) {
            return Err(ButtonError::component("render check failed"));
        }
        Ok(self.can_render_top.load(Ordering::SeqCst))
    }

    fn init(&self, props: ComponentProps) -> Arc<dyn ComponentInstance> {
        let instance = Arc::new(MockComponentInstance {
            fail_render: self.fail_render.load(Ordering::SeqCst),
            ..Default::default()
        });
        self.props.lock().unwrap().push(props);
        self.instances.lock().unwrap().push(instance.clone());
        instance
    }
}

#[derive(Default)]
pub struct MockUi {
    enabled: AtomicUsize,
    disabled: AtomicUsize,
    destroyed: Mutex<Vec<ButtonRef>>,
    vaulted_buttons: AtomicUsize,
    header_destroyed: AtomicBool,
}

impl MockUi {
    pub fn enabled_count(&self) -> usize {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn disabled_count(&self) -> usize {
        self.disabled.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> Vec<ButtonRef> {
        self.destroyed.lock().unwrap().clone()
    }

    pub fn set_vaulted_buttons(&self, count: usize) {
        self.vaulted_buttons.store(count, Ordering::SeqCst);
    }

    pub fn header_destroyed(&self) -> bool {
        self.header_destroyed.load(Ordering::SeqCst)
    }
}

impl ButtonUi for MockUi {
    fn enable_loading_spinner(&self, _button: &ButtonRef) {
        self.enabled.fetch_add(1, Ordering::SeqCst);
    }

    fn disable_loading_spinner(&self, _button: &ButtonRef) {
        self.disabled.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy_button(&self, button: &ButtonRef) {
        self.destroyed.lock().unwrap().push(button.clone());
    }

    fn vaulted_button_count(&self) -> usize {
        self.vaulted_buttons.load(Ordering::SeqCst)
    }

    fn destroy_vault_header(&self) {
        self.header_destroyed.store(true, Ordering::SeqCst);
    }
}

pub struct MockApi {
    enable_vault_calls: Mutex<Vec<String>>,
    fail_enable_vault: AtomicBool,
    validate_status: AtomicU16,
    validate_body: Mutex<Value>,
    validate_requests: Mutex<Vec<ValidatePaymentMethodRequest>>,
    delete_calls: Mutex<Vec<String>>,
    fail_delete: AtomicBool,
    validated_orders: Mutex<Vec<String>>,
    fail_validate_order: AtomicBool,
    client_config_updates: Mutex<Vec<ClientConfigUpdate>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            enable_vault_calls: Mutex::new(Vec::new()),
            fail_enable_vault: AtomicBool::new(false),
            validate_status: AtomicU16::new(200),
            validate_body: Mutex::new(Value::Null),
            validate_requests: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            fail_delete: AtomicBool::new(false),
            validated_orders: Mutex::new(Vec::new()),
            fail_validate_order: AtomicBool::new(false),
            client_config_updates: Mutex::new(Vec::new()),
        }
    }
}

impl MockApi {
    pub fn fail_enable_vault(&self) {
        self.fail_enable_vault.store(true, Ordering::SeqCst);
    }

    pub fn enable_vault_calls(&self) -> Vec<String> {
        self.enable_vault_calls.lock().unwrap().clone()
    }

    pub fn set_validate_status(&self, status: u16) {
        self.validate_status.store(status, Ordering::SeqCst);
    }

    pub fn set_validate_body(&self, body: Value) {
        *self.validate_body.lock().unwrap() = body;
    }

    pub fn validate_requests(&self) -> Vec<ValidatePaymentMethodRequest> {
        self.validate_requests.lock().unwrap().clone()
    }

    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    pub fn fail_validate_order(&self) {
        self.fail_validate_order.store(true, Ordering::SeqCst);
    }

    pub fn validated_orders(&self) -> Vec<String> {
        self.validated_orders.lock().unwrap().clone()
    }

    pub fn client_config_updates(&self) -> Vec<ClientConfigUpdate> {
        self.client_config_updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ButtonApi for MockApi {
    async fn enable_vault(&self, order_id: &str, _client_access_token: &str) -> Result<()> {
        self.enable_vault_calls
            .lock()
            .unwrap()
            .push(order_id.to_string());
        if self.fail_enable_vault.load(Ordering::SeqCst) {
            return Err(ButtonError::graphql("enable vault failed"));
        }
        Ok(())
    }

    async fn validate_payment_method(
        &self,
        request: &ValidatePaymentMethodRequest,
    ) -> Result<ValidatePaymentMethodResponse> {
        self.validate_requests.lock().unwrap().push(request.clone());
        Ok(ValidatePaymentMethodResponse {
            status: self.validate_status.load(Ordering::SeqCst),
            body: self.validate_body.lock().unwrap().clone(),
        })
    }

    async fn delete_vault(&self, payment_method_id: &str, _client_access_token: &str) -> Result<()> {
        self.delete_calls
            .lock()
            .unwrap()
            .push(payment_method_id.to_string());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ButtonError::http("delete failed"));
        }
        Ok(())
    }

    async fn validate_order(
        &self,
        order_id: &str,
        _client_id: &str,
        _merchant_id: &[String],
    ) -> Result<()> {
        self.validated_orders
            .lock()
            .unwrap()
            .push(order_id.to_string());
        if self.fail_validate_order.load(Ordering::SeqCst) {
            return Err(ButtonError::order_validation("payee mismatch"));
        }
        Ok(())
    }

    async fn update_client_config(&self, update: &ClientConfigUpdate) -> Result<()> {
        self.client_config_updates
            .lock()
            .unwrap()
            .push(update.clone());
        Ok(())
    }
}

pub struct MockPopupBridge {
    result: PopupBridgeResult,
    opened: Mutex<Vec<Url>>,
}

impl MockPopupBridge {
    pub fn new(op: PopupBridgeOp) -> Self {
        Self::with_result(PopupBridgeResult {
            op,
            payer_id: None,
            payment_id: None,
            token: None,
        })
    }

    pub fn with_result(result: PopupBridgeResult) -> Self {
        Self {
            result,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened_urls(&self) -> Vec<Url> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl PopupBridge for MockPopupBridge {
    fn return_url(&self) -> String {
        "app://return".to_string()
    }

    async fn open(&self, url: Url) -> Result<PopupBridgeResult> {
        self.opened.lock().unwrap().push(url);
        Ok(self.result.clone())
    }
}

pub struct MockNativeLauncher {
    outcome: NativeOutcome,
    launched: Mutex<Vec<Url>>,
}

impl MockNativeLauncher {
    pub fn new(outcome: NativeOutcome) -> Self {
        Self {
            outcome,
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn launched_urls(&self) -> Vec<Url> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl NativeLauncher for MockNativeLauncher {
    async fn launch(&self, url: Url) -> Result<NativeOutcome> {
        self.launched.lock().unwrap().push(url);
        Ok(self.outcome.clone())
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
    beacons: Mutex<Vec<String>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn beacons(&self) -> Vec<String> {
        self.beacons.lock().unwrap().clone()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn track(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn send_beacon(&self, url: &str) {
        self.beacons.lock().unwrap().push(url.to_string());
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn error(&self, _request: &RequestInfo, event: &str, context: Value) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), context));
    }
}

/// GraphQL executor answering every request with the same outcome
pub struct MockGraphql {
    response: Result<Value>,
    delay: Option<Duration>,
    requests: Mutex<Vec<GraphqlRequest>>,
}

impl MockGraphql {
    pub fn returning(data: Value) -> Self {
        Self {
            response: Ok(data),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ButtonError) -> Self {
        Self {
            response: Err(error),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<GraphqlRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphqlBatch for MockGraphql {
    async fn execute(&self, request: GraphqlRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

/// Mock collaborators plus recorders for the integrator callbacks
pub struct TestHarness {
    pub checkout: Arc<MockComponent>,
    pub card_fields: Arc<MockComponent>,
    pub popup_opener: Arc<MockPopupOpener>,
    pub ui: Arc<MockUi>,
    pub api: Arc<MockApi>,
    pub telemetry: Arc<RecordingTelemetry>,
    pub popup_bridge: Option<Arc<MockPopupBridge>>,
    pub native: Option<Arc<MockNativeLauncher>>,
    pub environment: Environment,
    approvals: Arc<Mutex<Vec<ApproveData>>>,
    cancels: Arc<AtomicUsize>,
    orders_created: Arc<AtomicUsize>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            checkout: Arc::new(MockComponent::default()),
            card_fields: Arc::new(MockComponent::default()),
            popup_opener: Arc::new(MockPopupOpener::default()),
            ui: Arc::new(MockUi::default()),
            api: Arc::new(MockApi::default()),
            telemetry: Arc::new(RecordingTelemetry::default()),
            popup_bridge: None,
            native: None,
            environment: Environment::default(),
            approvals: Arc::new(Mutex::new(Vec::new())),
            cancels: Arc::new(AtomicUsize::new(0)),
            orders_created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_distinct_top(mut self) -> Self {
        self.environment.topology = WindowTopology::nested();
        self
    }

    pub fn with_popup_bridge(mut self, bridge: Arc<MockPopupBridge>) -> Self {
        self.popup_bridge = Some(bridge);
        self
    }

    pub fn with_native(mut self, native: Arc<MockNativeLauncher>) -> Self {
        self.native = Some(native);
        self
    }

    pub fn components(&self) -> Components {
        let mut components = Components::new(
            self.checkout.clone(),
            self.card_fields.clone(),
            self.popup_opener.clone(),
            self.ui.clone(),
            self.api.clone(),
        )
        .with_telemetry(self.telemetry.clone());

        if let Some(bridge) = &self.popup_bridge {
            components = components.with_popup_bridge(bridge.clone());
        }
        if let Some(native) = &self.native {
            components = components.with_native(native.clone());
        }
        components
    }

    /// Props creating `ORDER1` and recording approvals and cancellations
    pub fn props(&self) -> Props {
        let orders_created = self.orders_created.clone();
        let create_order = CreateOrder::new(move || {
            orders_created.fetch_add(1, Ordering::SeqCst);
            async { Ok("ORDER1".to_string()) }
        });

        let approvals = self.approvals.clone();
        let cancels = self.cancels.clone();
        Props::new(
            "client-id",
            create_order,
            move |data: ApproveData, _actions: ApproveActions| {
                approvals.lock().unwrap().push(data);
                async { Ok(()) }
            },
        )
        .with_button_session_id("button-session")
        .with_on_cancel(move || {
            cancels.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
    }

    pub fn approvals(&self) -> Vec<ApproveData> {
        self.approvals.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn orders_created(&self) -> usize {
        self.orders_created.load(Ordering::SeqCst)
    }
}

/// Button context wired to the harness
pub fn test_context(harness: &TestHarness) -> ButtonContext {
    ButtonContext::new(
        harness.props(),
        ButtonConfig::new(harness.environment),
        ServiceData::default(),
        harness.components(),
    )
}
