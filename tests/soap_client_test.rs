//! HTTP invoker against a local mock SOAP endpoint

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixture;
use eccu_client::{
    EccuError, EccuService, HttpSoapInvoker, PropertyOptions, RequestOptions, SoapClientConfig,
    SoapError, SoapInvoker,
};
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn invoker_for(server: &MockServer) -> HttpSoapInvoker {
    HttpSoapInvoker::new(SoapClientConfig {
        endpoint: format!("{}/eccu-api/services/ECCUService", server.uri()),
        username: "operator".to_string(),
        password: "hunter2".to_string(),
        timeout_seconds: 5,
        ..Default::default()
    })
    .unwrap()
}

fn service_for(server: &MockServer) -> EccuService {
    EccuService::new(Arc::new(invoker_for(server)), "test notes", "hostheader")
}

fn soap_reply(status: u16, fixture_name: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("Content-Type", "text/xml;charset=UTF-8")
        .set_body_string(fixture(fixture_name))
}

#[tokio::test]
async fn test_upload_posts_envelope_with_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/eccu-api/services/ECCUService"))
        .and(basic_auth("operator", "hunter2"))
        .and(header("SOAPAction", "\"upload\""))
        .and(body_string_contains("<soapenv:Body><eccu:upload>"))
        .and(body_string_contains(
            "<propertyName xsi:type=\"xsd:string\">foo.com</propertyName>",
        ))
        .respond_with(soap_reply(200, "upload_success.xml"))
        .expect(1)
        .mount(&server)
        .await;

    let id = service_for(&server)
        .publish(
            "foo.com",
            "<eccu/>",
            PropertyOptions::default(),
            RequestOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(id, 48213);
}

#[tokio::test]
async fn test_http_401_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = service_for(&server).all(false).await.unwrap_err();
    assert!(matches!(err, EccuError::Unauthorized));
}

#[tokio::test]
async fn test_invalid_domain_fault_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(soap_reply(500, "invalid_domain_fault.xml"))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .publish(
            "bar.com",
            "<eccu/>",
            PropertyOptions::default(),
            RequestOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EccuError::InvalidDomain { ref property } if property == "bar.com"));
}

#[tokio::test]
async fn test_plain_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = invoker_for(&server)
        .call("getIds", "getIds", "")
        .await
        .unwrap_err();

    match err {
        SoapError::Http { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("Expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_listing_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<eccu:getIds>"))
        .respond_with(soap_reply(200, "get_ids.xml"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("<fileId xsi:type=\"xsd:int\">48210</fileId>"))
        .respond_with(soap_reply(200, "get_info_48210.xml"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("<fileId xsi:type=\"xsd:int\">48213</fileId>"))
        .respond_with(soap_reply(200, "get_info_48213.xml"))
        .expect(1)
        .mount(&server)
        .await;

    let requests = service_for(&server).all(true).await.unwrap();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].id, 48210);
    assert_eq!(requests[1].id, 48213);
    assert!(requests[1].file.content.is_some());
}

#[tokio::test]
async fn test_unknown_id_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("SOAPAction", "\"getInfo\""))
        .respond_with(soap_reply(500, "not_found_fault.xml"))
        .mount(&server)
        .await;

    let err = service_for(&server).find(999999, false).await.unwrap_err();
    assert!(matches!(err, EccuError::NotFound { id: 999999 }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let invoker = HttpSoapInvoker::new(SoapClientConfig {
        endpoint: "http://127.0.0.1:9/eccu".to_string(),
        timeout_seconds: 2,
        ..Default::default()
    })
    .unwrap();

    let err = invoker.call("getIds", "getIds", "").await.unwrap_err();
    assert!(matches!(err, SoapError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_reply_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(soap_reply(200, "get_ids.xml").set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let invoker = HttpSoapInvoker::new(SoapClientConfig {
        endpoint: server.uri(),
        timeout_seconds: 1,
        ..Default::default()
    })
    .unwrap();

    match invoker.call("getIds", "getIds", "").await.unwrap_err() {
        SoapError::Timeout {
            url,
            timeout_seconds,
        } => {
            assert_eq!(url, server.uri());
            assert_eq!(timeout_seconds, 1);
        }
        other => panic!("Expected timeout, got {:?}", other),
    }
}
