//! Execution pipeline: outcomes, observers, cancellation

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    FAULT_RESPONSE, ITEMS_RESPONSE, Item, Recorder, ScriptedTransport, client, envelope, url,
};
use xsoap_client::prelude::*;

fn observed(request: &mut ListRequest<Item>) -> Arc<Recorder> {
    let recorder = Arc::new(Recorder::default());
    request.register_item_observer(recorder.clone());
    request.register_observer(recorder.clone());
    recorder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_items_precede_completion() {
        let transport = ScriptedTransport::respond(200, ITEMS_RESPONSE);
        let client = client(transport.clone());
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds")
            .with_action("urn:GetItems")
            .expect("action is a valid header");
        let recorder = observed(&mut request);

        assert_eq!(request.state(), RequestState::Idle);
        request.execute().expect("execute inside runtime");
        assert_eq!(request.state(), RequestState::Running);

        let outcome = request.wait().await.expect("request ran");
        let items = outcome.completed().expect("completed");
        assert_eq!(items.len(), 2);
        assert_eq!(request.state(), RequestState::Completed);
        assert_eq!(recorder.events(), vec!["item 1 a", "item 2 b", "completed"]);
        assert_eq!(transport.calls(), 1);
        assert_eq!(transport.last_action().as_deref(), Some("\"urn:GetItems\""));
    }

    #[tokio::test]
    async fn test_fault_status_yields_fault_without_items() {
        let client = client(ScriptedTransport::respond(500, FAULT_RESPONSE));
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");
        let recorder = observed(&mut request);

        request.execute().expect("execute");
        let outcome = request.wait().await.expect("request ran");
        let fault = outcome.fault().expect("faulted");
        assert_eq!(fault.fault_string, "Item store unavailable");
        assert_eq!(request.state(), RequestState::Faulted);
        assert_eq!(recorder.events(), vec!["fault"]);
    }

    #[tokio::test]
    async fn test_fault_shaped_success_body_is_a_fault() {
        let client = client(ScriptedTransport::respond(200, FAULT_RESPONSE));
        let mut request = client
            .request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");

        request.execute().expect("execute");
        let outcome = request.wait().await.expect("request ran");
        assert_eq!(outcome.state(), RequestState::Faulted);
    }

    #[tokio::test]
    async fn test_unparsable_fault_body_is_status_error() {
        let client = client(ScriptedTransport::respond(500, "<html>down</html>"));
        let mut request = client
            .request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");

        request.execute().expect("execute");
        let outcome = request.wait().await.expect("request ran");
        let err = outcome.error().expect("errored");
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_other_status_is_errored() {
        let client = client(ScriptedTransport::respond(307, ""));
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");
        let recorder = observed(&mut request);

        request.execute().expect("execute");
        let outcome = request.wait().await.expect("request ran");
        let err = outcome.error().expect("errored");
        assert!(err.is_status());
        assert_eq!(err.status(), Some(StatusCode::TEMPORARY_REDIRECT));
        assert_eq!(err.url(), Some(&url()));
        assert_eq!(recorder.events(), vec!["error"]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_errored() {
        let client = client(ScriptedTransport::fail("connection refused"));
        let mut request = client
            .request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");

        request.execute().expect("execute");
        let outcome = request.wait().await.expect("request ran");
        let err = outcome.error().expect("errored");
        assert!(err.is_transport());
        assert_eq!(err.url(), Some(&url()));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_errored() {
        let truncated = "<Envelope><Body><GetItemsResponse><item><id>x</id>";
        let client = client(ScriptedTransport::respond(200, truncated));
        let mut request = client
            .request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");

        request.execute().expect("execute");
        let outcome = request.wait().await.expect("request ran");
        assert!(outcome.error().is_some_and(Error::is_data_format));
    }

    #[tokio::test]
    async fn test_cancel_before_response_reports_cancelled_only() {
        let transport =
            ScriptedTransport::respond_after(200, ITEMS_RESPONSE, Duration::from_millis(200));
        let client = client(transport);
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");
        let recorder = observed(&mut request);

        request.execute().expect("execute");
        request.cancel();
        assert_eq!(request.state(), RequestState::Cancelled);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(request.dispatch_pending(), 0);

        let outcome = request.wait().await.expect("terminal");
        assert_eq!(outcome.state(), RequestState::Cancelled);
        assert_eq!(recorder.events(), vec!["cancelled"]);
    }

    #[tokio::test]
    async fn test_cancel_after_terminal_is_ignored() {
        let client = client(ScriptedTransport::respond(200, ITEMS_RESPONSE));
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");
        let recorder = observed(&mut request);

        request.execute().expect("execute");
        request.wait().await.expect("request ran");
        request.cancel();

        assert_eq!(request.state(), RequestState::Completed);
        assert_eq!(recorder.events().last().map(String::as_str), Some("completed"));
    }

    #[tokio::test]
    async fn test_cancel_before_execute_is_ignored() {
        let client = client(ScriptedTransport::respond(200, ITEMS_RESPONSE));
        let mut request = client
            .request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");
        request.cancel();
        assert_eq!(request.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_debug_capture_keeps_both_documents() {
        let client = client(ScriptedTransport::respond(200, ITEMS_RESPONSE));
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds")
            .with_debug_capture(true);

        request.execute().expect("execute");
        request.wait().await.expect("request ran");
        assert!(request.request_xml().is_some_and(|xml| xml.contains("<GetItems/>")));
        assert_eq!(request.response_xml(), Some(ITEMS_RESPONSE));
    }

    #[tokio::test]
    async fn test_capture_is_off_by_default() {
        let client = client(ScriptedTransport::respond(200, ITEMS_RESPONSE));
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");

        request.execute().expect("execute");
        request.wait().await.expect("request ran");
        assert_eq!(request.request_xml(), None);
        assert_eq!(request.response_xml(), None);
    }

    #[tokio::test]
    async fn test_bounded_get_leaves_request_running() {
        let transport =
            ScriptedTransport::respond_after(200, ITEMS_RESPONSE, Duration::from_millis(300));
        let client = client(transport);
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");

        request.execute().expect("execute");
        let err = request.get(Duration::from_millis(10)).await.expect_err("bounded wait elapses");
        assert!(err.is_timeout());
        assert_eq!(request.state(), RequestState::Running);

        let outcome = request.get(Duration::from_secs(5)).await.expect("request finishes");
        assert_eq!(outcome.completed().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_execute_while_running_is_usage_error() {
        let transport =
            ScriptedTransport::respond_after(200, ITEMS_RESPONSE, Duration::from_millis(100));
        let client = client(transport.clone());
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");

        request.execute().expect("execute");
        let err = request.execute().expect_err("already running");
        assert!(err.is_usage());

        request.wait().await.expect("request ran");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_wait_before_execute_is_usage_error() {
        let client = client(ScriptedTransport::respond(200, ITEMS_RESPONSE));
        let mut request = client
            .request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");
        let err = request.wait().await.expect_err("never executed");
        assert!(err.is_usage());
    }

    #[tokio::test]
    async fn test_terminal_request_runs_again() {
        let transport = ScriptedTransport::respond(200, ITEMS_RESPONSE);
        let client = client(transport.clone());
        let mut request = client
            .list_request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");
        let recorder = observed(&mut request);

        request.execute().expect("first execution");
        request.wait().await.expect("first run");
        request.execute().expect("second execution");
        request.wait().await.expect("second run");

        assert_eq!(transport.calls(), 2);
        assert_eq!(
            recorder.events().iter().filter(|event| event.as_str() == "completed").count(),
            2
        );
    }

    #[test]
    fn test_execute_outside_runtime_is_usage_error() {
        let client = client(ScriptedTransport::respond(200, ITEMS_RESPONSE));
        let mut request = client
            .request::<Item, Soap11Fault>(url(), envelope())
            .expect("request builds");
        let err = request.execute().expect_err("no runtime");
        assert!(err.is_usage());
        assert_eq!(request.state(), RequestState::Idle);
    }

    #[test]
    fn test_client_caches_compiled_parsers() {
        let client = client(ScriptedTransport::respond(200, ITEMS_RESPONSE));
        let first = client.list_parser::<Item>().expect("list parser");
        let second = client.list_parser::<Item>().expect("list parser");
        assert!(Arc::ptr_eq(&first, &second));

        let stats = client.stats();
        assert_eq!(stats.parser_cache_hits, 1);
    }
}
