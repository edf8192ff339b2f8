mod test_websocket_flow;
