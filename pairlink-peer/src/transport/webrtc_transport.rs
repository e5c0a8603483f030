use crate::error::TransportError;
use crate::transport::{
    ChannelTransport, IceConnectionState, PeerTransport, TransportConfig, TransportEvent,
    TransportEventSink, TransportFactory,
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use pairlink_core::{IceCandidate, SdpKind, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Creates a [`WebRtcTransport`] for every new context.
#[derive(Clone, Default)]
pub struct WebRtcFactory {
    config: TransportConfig,
}

impl WebRtcFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for WebRtcFactory {
    async fn connect(
        &self,
        events: TransportEventSink,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let transport = WebRtcTransport::new(self.config.clone(), events)
            .await
            .map_err(|e| TransportError::new("create peer connection", e))?;
        Ok(Arc::new(transport))
    }
}

/// `webrtc` peer connection carrying data channels only.
pub struct WebRtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    events: TransportEventSink,
}

impl WebRtcTransport {
    pub async fn new(config: TransportConfig, events: TransportEventSink) -> Result<Self> {
        // Codecs are registered even though no media track is ever negotiated.
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let mut settings = SettingEngine::default();
        settings.set_include_loopback_candidate(config.include_loopback_candidates);

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .with_setting_engine(settings)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create RTCPeerConnection")?,
        );

        let state_events = events.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let events = state_events.clone();
                Box::pin(async move {
                    info!("{}: ICE connection state {:?}", events.context(), s);
                    let Some(state) = map_ice_state(s) else {
                        return;
                    };
                    events
                        .emit(TransportEvent::ConnectionStateChanged(state))
                        .await;
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    warn!("{}: could not serialize local candidate", events.context());
                    return;
                };
                events
                    .emit(TransportEvent::CandidateDiscovered(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                    }))
                    .await;
            })
        }));

        let negotiation_events = events.clone();
        peer_connection.on_negotiation_needed(Box::new(move || {
            let events = negotiation_events.clone();
            Box::pin(async move {
                events.emit(TransportEvent::NegotiationNeeded).await;
            })
        }));

        let dc_events = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let events = dc_events.clone();
            Box::pin(async move {
                debug!("{}: incoming data channel '{}'", events.context(), dc.label());
                // Announce the channel before wiring it so that its open event
                // can never overtake the announcement.
                let channel = Arc::new(WebRtcChannel::new(dc));
                events
                    .emit(TransportEvent::IncomingChannel(channel.clone()))
                    .await;
                channel.wire(events);
            })
        }));

        Ok(Self {
            peer_connection,
            events,
        })
    }

    fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription> {
        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        };
        Ok(rtc)
    }

    fn from_rtc(desc: RTCSessionDescription) -> Result<SessionDescription> {
        match desc.sdp_type {
            RTCSdpType::Offer => Ok(SessionDescription::offer(desc.sdp)),
            RTCSdpType::Answer => Ok(SessionDescription::answer(desc.sdp)),
            other => bail!("unsupported SDP type {other:?}"),
        }
    }
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| TransportError::new("create offer", e))?;
        Self::from_rtc(offer).map_err(|e| TransportError::new("create offer", e))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| TransportError::new("create answer", e))?;
        Self::from_rtc(answer).map_err(|e| TransportError::new("create answer", e))
    }

    async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), TransportError> {
        let desc = Self::to_rtc(desc).map_err(|e| TransportError::new("parse local SDP", e))?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(|e| TransportError::new("set local description", e))
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), TransportError> {
        let desc = Self::to_rtc(desc).map_err(|e| TransportError::new("parse remote SDP", e))?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| TransportError::new("set remote description", e))
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            ..Default::default()
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|e| TransportError::new("add ICE candidate", e))
    }

    async fn create_data_channel(
        &self,
        label: &str,
    ) -> Result<Arc<dyn ChannelTransport>, TransportError> {
        let init = RTCDataChannelInit {
            ordered: Some(true),
            ..Default::default()
        };
        let dc = self
            .peer_connection
            .create_data_channel(label, Some(init))
            .await
            .map_err(|e| TransportError::new("create data channel", e))?;

        let channel = Arc::new(WebRtcChannel::new(dc));
        channel.wire(self.events.clone());
        Ok(channel)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| TransportError::new("close peer connection", e))
    }
}

pub struct WebRtcChannel {
    inner: Arc<RTCDataChannel>,
}

impl WebRtcChannel {
    fn new(inner: Arc<RTCDataChannel>) -> Self {
        Self { inner }
    }

    fn wire(&self, events: TransportEventSink) {
        let open_events = events.clone();
        self.inner.on_open(Box::new(move || {
            let events = open_events.clone();
            Box::pin(async move {
                info!("{}: data channel open", events.context());
                events.emit(TransportEvent::ChannelOpen).await;
            })
        }));

        let msg_events = events.clone();
        self.inner
            .on_message(Box::new(move |msg: DataChannelMessage| {
                let events = msg_events.clone();
                Box::pin(async move {
                    events.emit(TransportEvent::ChannelMessage(msg.data)).await;
                })
            }));

        let close_events = events;
        self.inner.on_close(Box::new(move || {
            let events = close_events.clone();
            Box::pin(async move {
                info!("{}: data channel closed", events.context());
                events.emit(TransportEvent::ChannelClosed).await;
            })
        }));
    }
}

#[async_trait]
impl ChannelTransport for WebRtcChannel {
    fn label(&self) -> String {
        self.inner.label().to_owned()
    }

    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        self.inner
            .send_text(text)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::new("send on data channel", e))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner
            .close()
            .await
            .map_err(|e| TransportError::new("close data channel", e))
    }
}

fn map_ice_state(state: RTCIceConnectionState) -> Option<IceConnectionState> {
    Some(match state {
        RTCIceConnectionState::New => IceConnectionState::New,
        RTCIceConnectionState::Checking => IceConnectionState::Checking,
        RTCIceConnectionState::Connected => IceConnectionState::Connected,
        RTCIceConnectionState::Completed => IceConnectionState::Completed,
        RTCIceConnectionState::Disconnected => IceConnectionState::Disconnected,
        RTCIceConnectionState::Failed => IceConnectionState::Failed,
        RTCIceConnectionState::Closed => IceConnectionState::Closed,
        _ => return None,
    })
}
