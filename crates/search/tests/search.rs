mod common;

use std::sync::Arc;

use common::{StubTransport, numbered_hit};
use lgrep_search::{Client, Error, Hit, MAX_SEARCH_SIZE, Query, SearchSpec, SearchTransport, StreamState};
use pretty_assertions::assert_eq;

fn client(transport: StubTransport) -> (Client, Arc<StubTransport>) {
	let transport = Arc::new(transport);
	let shared: Arc<dyn SearchTransport> = transport.clone();
	(Client::from_shared(shared), transport)
}

fn source_number(doc: &lgrep_search::Document) -> u64 {
	doc.to_map().unwrap()["n"].as_u64().unwrap()
}

#[tokio::test]
async fn empty_query_is_rejected_before_any_request() {
	let (client, transport) = client(StubTransport::with_documents(10));
	let spec = SearchSpec::new().with_size(1).with_index("");

	let err = client.search(&Query::lucene(""), &spec).await.unwrap_err();

	assert!(matches!(err, Error::EmptySearch));
	assert!(err.is_config());
	transport.calls(|calls| {
		assert_eq!(calls.validate + calls.search + calls.scroll, 0);
	});
}

#[tokio::test]
async fn large_request_without_index_is_a_config_error() {
	let (client, transport) = client(StubTransport::with_documents(10));
	let spec = SearchSpec::new().with_size(MAX_SEARCH_SIZE + 1);

	let err = client.search(&Query::lucene("*"), &spec).await.unwrap_err();

	assert!(matches!(err, Error::IndexRequired));
	transport.calls(|calls| assert_eq!(calls.validate + calls.scroll, 0));
}

#[tokio::test]
async fn zero_size_returns_a_finished_stream() {
	let (client, transport) = client(StubTransport::with_documents(10));
	let spec = SearchSpec::new().with_size(0);

	let stream = client.search(&Query::lucene("*"), &spec).await.unwrap();
	assert_eq!(stream.collect_all().await.unwrap(), vec![]);
	transport.calls(|calls| assert_eq!(calls.search, 0));
}

#[tokio::test]
async fn single_page_delivers_hits_in_order() {
	let (client, transport) = client(StubTransport::with_documents(50));
	let spec = SearchSpec::new().with_size(25);

	let docs = client.search_all(&Query::lucene("*"), &spec).await.unwrap();

	assert_eq!(docs.iter().map(source_number).collect::<Vec<_>>(), (0..25).collect::<Vec<_>>());
	transport.calls(|calls| {
		assert_eq!(calls.validate, 1);
		assert_eq!(calls.search, 1);
		assert_eq!(calls.scroll, 0);
	});
}

#[tokio::test]
async fn validation_failure_aborts_before_search() {
	let (client, transport) = client(StubTransport {
		invalid: true,
		..StubTransport::with_documents(10)
	});

	let err = client.search(&Query::lucene("*"), &SearchSpec::new()).await.unwrap_err();

	assert_eq!(err.to_string(), "unknown field");
	transport.calls(|calls| assert_eq!(calls.search, 0));
}

#[tokio::test]
async fn skip_validation_skips_the_round_trip() {
	let (client, transport) = client(StubTransport {
		invalid: true,
		..StubTransport::with_documents(10)
	});
	let spec = SearchSpec::new().with_skip_validation(true);

	let docs = client.search_all(&Query::lucene("*"), &spec).await.unwrap();

	assert_eq!(docs.len(), 10);
	transport.calls(|calls| assert_eq!(calls.validate, 0));
}

#[tokio::test]
async fn corrupt_document_is_reported_without_ending_the_stream() {
	let corrupt = Hit {
		id: Some("2".into()),
		source: Some(br#"{"n": "#.to_vec()),
		..Hit::default()
	};
	let (client, _) = client(StubTransport {
		page: Some(vec![numbered_hit(1), corrupt, numbered_hit(3)]),
		..StubTransport::with_documents(3)
	});

	let mut stream = client.search(&Query::lucene("*"), &SearchSpec::new()).await.unwrap();
	let mut delivered = Vec::new();
	let mut errors = Vec::new();
	stream
		.for_each(
			|doc| {
				delivered.push(source_number(&doc));
				Ok(())
			},
			|err| {
				errors.push(err);
				Ok(())
			},
		)
		.await
		.unwrap();

	assert_eq!(delivered, vec![1, 3]);
	assert_eq!(errors.len(), 1);
	assert!(matches!(errors[0], Error::Document { ref id, .. } if id == "2"));
}

#[tokio::test]
async fn single_page_failure_is_published_once() {
	let (client, transport) = client(StubTransport {
		fail_search: true,
		..StubTransport::with_documents(3)
	});

	let mut stream = client.search(&Query::lucene("*"), &SearchSpec::new()).await.unwrap();
	let mut errors = 0;
	let mut results = 0;
	stream
		.for_each(
			|_| {
				results += 1;
				Ok(())
			},
			|_| {
				errors += 1;
				Ok(())
			},
		)
		.await
		.unwrap();

	assert_eq!((results, errors), (0, 1));
	transport.calls(|calls| assert_eq!(calls.search, 1));
	assert_eq!(stream.state(), StreamState::Stopped);
}

#[tokio::test]
async fn scroll_delivers_exactly_the_requested_size() {
	let (client, transport) = client(StubTransport::with_documents(20_000));
	let spec = SearchSpec::new().with_size(10_050).with_index("logs-*");

	let docs = client.search_all(&Query::lucene("*"), &spec).await.unwrap();

	assert_eq!(docs.len(), 10_050);
	assert_eq!(source_number(&docs[10_049]), 10_049);
	transport.calls(|calls| {
		assert_eq!(calls.scroll, 101);
		assert_eq!(calls.continued_with[0], None);
		assert_eq!(calls.continued_with[1].as_deref(), Some("scroll-0"));
		assert_eq!(calls.cleared, calls.issued);
	});
}

#[tokio::test]
async fn scroll_stops_quietly_when_exhausted() {
	let (client, transport) = client(StubTransport::with_documents(10_230));
	let spec = SearchSpec::new().with_size(50_000).with_index("logs-*");

	let docs = client.search_all(&Query::lucene("*"), &spec).await.unwrap();

	assert_eq!(docs.len(), 10_230);
	transport.calls(|calls| {
		assert_eq!(calls.cleared.len(), calls.issued.len());
		assert!(!calls.cleared.is_empty());
	});
}

#[tokio::test]
async fn scroll_ending_on_an_empty_page_clears_its_last_cursor() {
	let (client, transport) = client(StubTransport {
		empty_tail: true,
		..StubTransport::with_documents(10_230)
	});
	let spec = SearchSpec::new().with_size(50_000).with_index("logs-*");

	let docs = client.search_all(&Query::lucene("*"), &spec).await.unwrap();

	assert_eq!(docs.len(), 10_230);
	transport.calls(|calls| {
		assert_eq!(calls.issued.last().map(String::as_str), Some("scroll-103"));
		assert_eq!(calls.cleared, calls.issued);
	});
}

#[tokio::test]
async fn corrupt_scroll_hit_does_not_count_towards_the_size() {
	let (client, transport) = client(StubTransport {
		corrupt: Some(150),
		stable_id: Some("stable"),
		..StubTransport::with_documents(20_000)
	});
	let spec = SearchSpec::new().with_size(10_050).with_index("logs-*");

	let mut stream = client.search(&Query::lucene("*"), &spec).await.unwrap();
	let mut delivered = Vec::new();
	let mut errors = Vec::new();
	stream
		.for_each(
			|doc| {
				delivered.push(source_number(&doc));
				Ok(())
			},
			|err| {
				errors.push(err);
				Ok(())
			},
		)
		.await
		.unwrap();

	assert_eq!(delivered.len(), 10_050);
	assert!(!delivered.contains(&150));
	assert_eq!(delivered.last(), Some(&10_050));
	assert_eq!(errors.len(), 1);
	assert!(matches!(errors[0], Error::Document { ref id, .. } if id == "150"));
	transport.calls(|calls| assert_eq!(calls.cleared, vec!["stable"]));
}

#[tokio::test]
async fn scroll_failure_keeps_earlier_results_and_retires_cursors() {
	let (client, transport) = client(StubTransport {
		fail_scroll_at: Some(3),
		..StubTransport::with_documents(20_000)
	});
	let spec = SearchSpec::new().with_size(15_000).with_index("logs-*");

	let mut stream = client.search(&Query::lucene("*"), &spec).await.unwrap();
	let mut results = 0;
	let mut errors = Vec::new();
	stream
		.for_each(
			|_| {
				results += 1;
				Ok(())
			},
			|err| {
				errors.push(err);
				Ok(())
			},
		)
		.await
		.unwrap();

	assert_eq!(results, 300);
	assert_eq!(errors.len(), 1);
	assert!(matches!(errors[0], Error::Scroll(_)));
	transport.calls(|calls| assert_eq!(calls.cleared, vec!["scroll-0", "scroll-1", "scroll-2"]));
}

#[tokio::test]
async fn failed_cursor_clearing_is_not_fatal() {
	let (client, _) = client(StubTransport {
		fail_clear: true,
		..StubTransport::with_documents(20_000)
	});
	let spec = SearchSpec::new().with_size(10_001).with_index("logs-*");

	let docs = client.search_all(&Query::lucene("*"), &spec).await.unwrap();
	assert_eq!(docs.len(), 10_001);
}

#[tokio::test]
async fn quitting_a_scroll_retires_its_cursor() {
	let (client, transport) = client(StubTransport::with_documents(100_000));
	let spec = SearchSpec::new().with_size(90_000).with_index("logs-*");

	let mut stream = client.search(&Query::lucene("*"), &spec).await.unwrap();
	let mut seen = 0;
	let err = stream
		.for_each(
			|_| {
				seen += 1;
				if seen == 250 { Err(Error::handler("stop")) } else { Ok(()) }
			},
			Err,
		)
		.await
		.unwrap_err();

	assert_eq!(err.to_string(), "stop");
	assert_eq!(stream.state(), StreamState::Stopped);
	transport.calls(|calls| {
		assert!(calls.scroll < 900, "scroll kept running after quit: {} pages", calls.scroll);
		assert_eq!(calls.cleared, calls.issued);
	});
}
