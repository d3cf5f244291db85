//! Host, client, and service behaviour over real channels.

use std::collections::HashMap;

use tokio::io::BufReader;
use tokio::sync::mpsc;

use jsxgrade_host::protocol::INVALID_REQUEST;
use jsxgrade_host::{
    serve_lines, AnalysisService, Envelope, Host, HostConfig, OffloadClient, RequestType,
    Response, ServiceError,
};

const WELCOME: &str = "function Welcome() { return <div>Hi</div>; }";

/// A client wired to channels the test drives as the host.
fn fake_host() -> (
    OffloadClient,
    mpsc::Receiver<Envelope>,
    mpsc::Sender<Response>,
) {
    let (request_tx, request_rx) = mpsc::channel(8);
    let (response_tx, response_rx) = mpsc::channel(8);
    (
        OffloadClient::with_channels(request_tx, response_rx),
        request_rx,
        response_tx,
    )
}

#[tokio::test]
async fn responses_are_matched_by_id_not_arrival_order() {
    let (client, mut requests, responses) = fake_host();

    let first = client
        .submit(RequestType::Evaluate, WELCOME, Some("hasJSX"))
        .await
        .unwrap();
    let second = client
        .submit(RequestType::Evaluate, "let x = 1", Some("hasJSX"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    let a = requests.recv().await.unwrap();
    let b = requests.recv().await.unwrap();
    assert_eq!(a.request.id, first.id);
    assert_eq!(b.request.id, second.id);

    // Answer in reverse order.
    responses
        .send(Response::evaluated(b.request.id.clone(), false))
        .await
        .unwrap();
    responses
        .send(Response::evaluated(a.request.id.clone(), true))
        .await
        .unwrap();

    let first_id = first.id.clone();
    let second_id = second.id.clone();
    let first_response = first.wait().await.unwrap();
    let second_response = second.wait().await.unwrap();
    assert_eq!(first_response, Response::evaluated(first_id, true));
    assert_eq!(second_response, Response::evaluated(second_id, false));
    assert_eq!(client.pending_count(), 0);
}

#[tokio::test]
async fn stray_responses_are_ignored() {
    let (client, mut requests, responses) = fake_host();
    let ticket = client
        .submit(RequestType::Parse, WELCOME, None)
        .await
        .unwrap();
    let envelope = requests.recv().await.unwrap();

    responses
        .send(Response::evaluated("xyz", true))
        .await
        .unwrap();
    responses
        .send(Response::error(envelope.request.id.clone(), "boom"))
        .await
        .unwrap();

    let response = ticket.wait().await.unwrap();
    assert_eq!(response.error.as_deref(), Some("boom"));
}

#[tokio::test]
async fn cancel_trips_the_request_token() {
    let (client, mut requests, responses) = fake_host();
    let ticket = client
        .submit(RequestType::Parse, WELCOME, None)
        .await
        .unwrap();
    let envelope = requests.recv().await.unwrap();
    assert!(!envelope.token.is_cancelled());

    assert!(client.cancel(&ticket.id));
    assert!(envelope.token.is_cancelled());
    assert!(!client.cancel("not-a-request"));

    responses
        .send(Response::cancelled(envelope.request.id.clone()))
        .await
        .unwrap();
    assert!(ticket.wait().await.unwrap().is_cancelled());
}

#[tokio::test]
async fn closed_host_is_reported() {
    let (client, requests, responses) = fake_host();
    let ticket = client
        .submit(RequestType::Parse, WELCOME, None)
        .await
        .unwrap();
    drop(responses);
    assert_eq!(ticket.wait().await.unwrap_err(), ServiceError::HostClosed);

    drop(requests);
    assert_eq!(
        client
            .submit(RequestType::Parse, WELCOME, None)
            .await
            .unwrap_err(),
        ServiceError::HostClosed
    );
}

#[tokio::test]
async fn service_over_real_host() {
    let client = OffloadClient::new(Host::spawn(HostConfig::default()));

    let ctx = client.parse_code(WELCOME).await.unwrap();
    assert_eq!(ctx.jsx_element_name.as_deref(), Some("div"));

    let broken = client.parse_code("const x = {").await.unwrap();
    assert!(broken.parse_error.is_some());

    assert_eq!(
        client.parse_code("").await.unwrap_err(),
        ServiceError::Parse(INVALID_REQUEST.into())
    );
    assert_eq!(
        client.evaluate_checker(WELCOME, "").await.unwrap_err(),
        ServiceError::Evaluate(INVALID_REQUEST.into())
    );
}

#[tokio::test]
async fn concurrent_requests_resolve_independently() {
    let client = OffloadClient::new(Host::spawn(HostConfig::default()));
    let cases: Vec<(String, &str, bool)> = (0..20)
        .map(|i| {
            if i % 2 == 0 {
                (format!("function F{i}() {{ return <p /> }}"), "isJSXElement", true)
            } else {
                (format!("const v{i} = {i};"), "hasJSX", false)
            }
        })
        .collect();

    let verdicts = futures::future::join_all(
        cases
            .iter()
            .map(|(code, checker, _)| client.evaluate_checker(code, checker)),
    )
    .await;

    for ((code, _, expected), verdict) in cases.iter().zip(verdicts) {
        assert_eq!(verdict.unwrap(), *expected, "{code}");
    }
}

#[tokio::test]
async fn serve_lines_answers_every_line() {
    let input = [
        r#"{"type":"evaluate","id":"abc","code":"function Welcome() { return <div>Hi</div>; }","checker":"isJSXElement"}"#,
        r#"{"type":"parse","id":"xyz","code":"const A = () => <a />"}"#,
        "",
        r#"{"type":"compile","id":"bad"}"#,
        "not json",
    ]
    .join("\n");
    let mut output = Vec::new();
    serve_lines(BufReader::new(input.as_bytes()), &mut output, HostConfig::default())
        .await
        .unwrap();

    let responses: HashMap<String, Response> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| {
            let response: Response = serde_json::from_str(line).unwrap();
            (response.id.clone(), response)
        })
        .collect();
    assert_eq!(responses.len(), 4);
    assert_eq!(responses["abc"].passed, Some(true));
    assert!(responses["xyz"].result.as_ref().unwrap().has_jsx);
    assert_eq!(responses["bad"].error.as_deref(), Some(INVALID_REQUEST));
    assert!(responses[""]
        .error
        .as_deref()
        .unwrap()
        .starts_with("Malformed request"));
}
